//! OpenAI Assistants API integration.

pub mod client;
pub mod types;

pub use client::OpenAiAssistantClient;
