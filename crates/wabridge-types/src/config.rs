//! Configuration types for wabridge.
//!
//! `BridgeConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty or missing file yields a working (if unconfigured)
//! bridge. The API key is deliberately not part of this struct: it is only
//! ever read from the environment.

use serde::{Deserialize, Serialize};

use crate::assistant::{
    DEFAULT_ASSISTANT_INSTRUCTIONS, DEFAULT_ASSISTANT_MODEL, DEFAULT_ASSISTANT_NAME,
    DEFAULT_FALLBACK_TEXT,
};

/// Top-level configuration, loaded from `~/.wabridge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Reply sent when no API key is configured.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,

    #[serde(default)]
    pub assistant: AssistantSettings,

    #[serde(default)]
    pub poll: PollSettings,
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            fallback_text: default_fallback_text(),
            assistant: AssistantSettings::default(),
            poll: PollSettings::default(),
        }
    }
}

/// Remote assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// Id of the provisioned assistant resource. Required to start runs.
    #[serde(default)]
    pub assistant_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name used when provisioning a new assistant.
    #[serde(default = "default_name")]
    pub name: String,

    /// System instructions used when provisioning a new assistant.
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// Model used when provisioning a new assistant.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_string()
}

fn default_instructions() -> String {
    DEFAULT_ASSISTANT_INSTRUCTIONS.to_string()
}

fn default_model() -> String {
    DEFAULT_ASSISTANT_MODEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            assistant_id: None,
            base_url: default_base_url(),
            name: default_name(),
            instructions: default_instructions(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Run polling cadence and bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Growth factor applied to the interval after every poll.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Total wait before giving up on a run. `0` waits indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_initial_interval_ms() -> u64 {
    500
}

fn default_max_interval_ms() -> u64 {
    4_000
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
