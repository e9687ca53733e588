//! Assistant service port traits.
//!
//! `AssistantApi` covers the calls made while answering a message;
//! `AssistantAdmin` covers one-time provisioning of the assistant resource.
//! Both use RPITIT; the concrete HTTP implementation lives in wabridge-infra.

use std::future::Future;
use std::path::Path;

use wabridge_types::assistant::{
    Assistant, AssistantDefinition, AssistantError, Run, RunId, SessionMessage, UploadedFile,
};
use wabridge_types::session::SessionId;

/// Conversation-level operations against the remote assistant service.
///
/// Every method is one network round trip; nothing is cached locally.
pub trait AssistantApi: Send + Sync {
    /// Create a new, empty remote conversation.
    fn create_session(&self) -> impl Future<Output = Result<SessionId, AssistantError>> + Send;

    /// Append a `user` message to a conversation.
    ///
    /// Returns `AssistantError::NotFound` if the conversation no longer exists.
    fn post_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> impl Future<Output = Result<(), AssistantError>> + Send;

    /// Start generating the next assistant message with the given assistant.
    fn start_run(
        &self,
        session_id: &SessionId,
        assistant_id: &str,
    ) -> impl Future<Output = Result<Run, AssistantError>> + Send;

    /// Fetch the current state of a run.
    fn retrieve_run(
        &self,
        session_id: &SessionId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, AssistantError>> + Send;

    /// List the most recent messages of a conversation, newest first.
    fn list_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<SessionMessage>, AssistantError>> + Send;
}

/// Provisioning operations for the remote assistant resource.
pub trait AssistantAdmin: Send + Sync {
    /// Upload a local file for assistant use.
    fn upload_file(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<UploadedFile, AssistantError>> + Send;

    /// Create an assistant resource from a definition.
    fn create_assistant(
        &self,
        definition: &AssistantDefinition,
    ) -> impl Future<Output = Result<Assistant, AssistantError>> + Send;

    /// Fetch an existing assistant resource.
    fn retrieve_assistant(
        &self,
        assistant_id: &str,
    ) -> impl Future<Output = Result<Assistant, AssistantError>> + Send;
}
