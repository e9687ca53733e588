//! Shared domain types for wabridge.
//!
//! Users, sessions, runs, assistant resources, configuration, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod assistant;
pub mod config;
pub mod error;
pub mod session;
