//! OpenAI Assistants API (v2) wire types.
//!
//! Request and response bodies exactly as the HTTP API shapes them. They are
//! converted into the provider-neutral types from `wabridge-types` at the
//! client boundary and never leave this module's crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wabridge_types::assistant::{
    Assistant, AssistantDefinition, AssistantError, MessageRole, Run, RunError, RunId, RunStatus,
    SessionMessage, UploadedFile,
};
use wabridge_types::session::SessionId;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body for `POST /threads/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Body for `POST /threads/{id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
}

/// Body for `POST /assistants`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistantRequest<'a> {
    pub name: &'a str,
    pub instructions: &'a str,
    pub model: &'a str,
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources<'a>>,
}

impl<'a> From<&'a AssistantDefinition> for CreateAssistantRequest<'a> {
    fn from(def: &'a AssistantDefinition) -> Self {
        if def.knowledge_file_ids.is_empty() {
            return Self {
                name: &def.name,
                instructions: &def.instructions,
                model: &def.model,
                tools: Vec::new(),
                tool_resources: None,
            };
        }

        Self {
            name: &def.name,
            instructions: &def.instructions,
            model: &def.model,
            tools: vec![ToolSpec {
                kind: "file_search".to_string(),
            }],
            tool_resources: Some(ToolResources {
                file_search: FileSearchResources {
                    vector_stores: vec![VectorStoreSpec {
                        file_ids: &def.knowledge_file_ids,
                    }],
                },
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResources<'a> {
    pub file_search: FileSearchResources<'a>,
}

/// Files are attached through a vector store created inline with the assistant.
#[derive(Debug, Clone, Serialize)]
pub struct FileSearchResources<'a> {
    pub vector_stores: Vec<VectorStoreSpec<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorStoreSpec<'a> {
    pub file_ids: &'a [String],
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `thread` object. Only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

/// `thread.run` object.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub thread_id: String,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunErrorObject {
    pub code: String,
    pub message: String,
}

impl TryFrom<RunObject> for Run {
    type Error = AssistantError;

    fn try_from(obj: RunObject) -> Result<Self, Self::Error> {
        let status: RunStatus = obj.status.parse().map_err(AssistantError::Deserialization)?;
        Ok(Run {
            id: RunId(obj.id),
            session_id: SessionId(obj.thread_id),
            status,
            last_error: obj.last_error.map(|e| RunError {
                code: e.code,
                message: e.message,
            }),
        })
    }
}

/// Paginated `list` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// `thread.message` object.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    pub created_at: i64,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
}

impl From<MessageObject> for SessionMessage {
    fn from(obj: MessageObject) -> Self {
        let role = if obj.role == "assistant" {
            MessageRole::Assistant
        } else {
            MessageRole::User
        };
        let text = obj
            .content
            .into_iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text.map(|t| t.value))
            .collect::<Vec<_>>()
            .join("\n");
        SessionMessage {
            id: obj.id,
            role,
            text,
            created_at: DateTime::<Utc>::from_timestamp(obj.created_at, 0).unwrap_or_default(),
            run_id: obj.run_id.map(RunId),
        }
    }
}

/// `assistant` object.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl From<AssistantObject> for Assistant {
    fn from(obj: AssistantObject) -> Self {
        Assistant {
            id: obj.id,
            name: obj.name,
            model: obj.model,
            instructions: obj.instructions,
            tools: obj.tools.into_iter().map(|t| t.kind).collect(),
        }
    }
}

/// `file` object.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub bytes: u64,
}

impl From<FileObject> for UploadedFile {
    fn from(obj: FileObject) -> Self {
        UploadedFile {
            id: obj.id,
            filename: obj.filename,
            bytes: obj.bytes,
        }
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
