//! Assistant service types for wabridge.
//!
//! These model the remote assistant service's resources (runs, messages,
//! assistants, uploaded files) in a provider-neutral shape, plus the error
//! taxonomy for every remote interaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RepositoryError;
use crate::session::SessionId;

/// Default assistant display name used when provisioning.
pub const DEFAULT_ASSISTANT_NAME: &str = "WhatsApp AI Assistant";

/// Default system instructions used when provisioning.
pub const DEFAULT_ASSISTANT_INSTRUCTIONS: &str =
    "You're a helpful WhatsApp assistant. Be friendly, concise, and helpful in your responses.";

/// Default model for newly provisioned assistants.
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4-1106-preview";

/// Reply returned when no credential is configured.
pub const DEFAULT_FALLBACK_TEXT: &str = "I'm sorry, but the AI service is not configured. Please set up your OpenAI API key to enable AI responses.";

/// Identifier of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a generation run, using the remote service's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Whether polling should stop at this status.
    ///
    /// `requires_action` counts as terminal: wabridge registers no function
    /// tools, so nothing would ever submit the outputs the run waits for.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(RunStatus::Queued),
            "in_progress" => Ok(RunStatus::InProgress),
            "requires_action" => Ok(RunStatus::RequiresAction),
            "cancelling" => Ok(RunStatus::Cancelling),
            "cancelled" => Ok(RunStatus::Cancelled),
            "failed" => Ok(RunStatus::Failed),
            "completed" => Ok(RunStatus::Completed),
            "incomplete" => Ok(RunStatus::Incomplete),
            "expired" => Ok(RunStatus::Expired),
            other => Err(format!("invalid run status: '{other}'")),
        }
    }
}

/// Error detail the remote service attaches to a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A snapshot of a generation run as last observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub session_id: SessionId,
    pub status: RunStatus,
    pub last_error: Option<RunError>,
}

/// Author of a message in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message stored in a remote session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: String,
    pub role: MessageRole,
    /// Concatenated text content; non-text parts are dropped.
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Run that wrote the message; `None` for user messages.
    #[serde(default)]
    pub run_id: Option<RunId>,
}

/// Text produced by a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReply {
    pub session_id: SessionId,
    pub run_id: RunId,
    pub text: String,
}

/// Everything needed to create the remote assistant resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantDefinition {
    pub name: String,
    pub instructions: String,
    pub model: String,
    /// Uploaded knowledge files; a non-empty list enables file search.
    #[serde(default)]
    pub knowledge_file_ids: Vec<String>,
}

impl Default for AssistantDefinition {
    fn default() -> Self {
        Self {
            name: DEFAULT_ASSISTANT_NAME.to_string(),
            instructions: DEFAULT_ASSISTANT_INSTRUCTIONS.to_string(),
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            knowledge_file_ids: Vec::new(),
        }
    }
}

/// The remote assistant resource as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub name: Option<String>,
    pub model: String,
    pub instructions: Option<String>,
    /// Tool type names (e.g. "file_search").
    pub tools: Vec<String>,
}

/// A file uploaded to the remote service for assistant use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    pub bytes: u64,
}

/// Errors from the assistant service and the conversation flow built on it.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant service is not configured (missing API key)")]
    NotConfigured,

    #[error("no assistant id configured (set OPENAI_ASSISTANT_ID)")]
    MissingAssistantId,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited by assistant service")]
    RateLimited,

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("assistant service error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("assistant run failed: {detail}")]
    RunFailed { detail: String },

    #[error("assistant run ended with status '{status}'")]
    RunEnded { status: RunStatus },

    #[error("assistant run {run_id} did not finish within {waited:?}")]
    TimedOut { run_id: RunId, waited: Duration },

    #[error("session {session_id} has no assistant reply")]
    EmptyReply { session_id: SessionId },

    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}
