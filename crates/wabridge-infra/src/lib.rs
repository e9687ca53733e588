//! Infrastructure layer for wabridge.
//!
//! Contains implementations of the port traits defined in `wabridge-core`:
//! the SQLite session store and the OpenAI Assistants HTTP client, plus the
//! configuration loader.

pub mod config;
pub mod openai;
pub mod sqlite;
