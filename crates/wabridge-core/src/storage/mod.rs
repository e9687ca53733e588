//! Storage abstractions for wabridge.
//!
//! Implementations live in wabridge-infra.

pub mod session_store;
