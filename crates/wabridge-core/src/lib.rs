//! Conversation flow and port trait definitions for wabridge.
//!
//! This crate defines the "ports" (`SessionStore`, `AssistantApi`,
//! `AssistantAdmin`) that the infrastructure layer implements. It depends
//! only on `wabridge-types` -- never on `wabridge-infra` or any database or
//! HTTP crate.

pub mod assistant;
pub mod conversation;
pub mod provision;
pub mod responder;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
