//! Response orchestration: turn one inbound user message into one reply.
//!
//! Two [`ReplyGenerator`] implementations exist. [`AssistantResponder`] drives
//! the full session → message → run → poll flow; [`FallbackResponder`] is used
//! when no API credential is configured and answers with static text without
//! touching the network or the session store. The application picks one at
//! startup and erases it behind [`BoxReplyGenerator`].

pub mod box_generator;

pub use box_generator::BoxReplyGenerator;

use std::future::Future;

use tracing::{Instrument, info, info_span, warn};

use wabridge_types::assistant::{AssistantError, GeneratedReply};
use wabridge_types::session::{SessionId, UserId};

use crate::assistant::api::AssistantApi;
use crate::assistant::poller::RunPoller;
use crate::conversation::{ConversationClient, ResolvedSession, UserLocks};
use crate::storage::session_store::SessionStore;

/// Produces the reply text for a user message.
///
/// Uses RPITIT; wrap in [`BoxReplyGenerator`] for dynamic dispatch.
pub trait ReplyGenerator: Send + Sync {
    /// Whether replies come from the remote assistant.
    fn is_enabled(&self) -> bool;

    /// Generate the reply to `text` sent by `user_id`.
    ///
    /// `display_name` is only used for logging.
    fn generate_response(
        &self,
        text: &str,
        user_id: &UserId,
        display_name: &str,
    ) -> impl Future<Output = Result<String, AssistantError>> + Send;
}

/// Degraded-mode generator that always returns the same text.
pub struct FallbackResponder {
    text: String,
}

impl FallbackResponder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ReplyGenerator for FallbackResponder {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn generate_response(
        &self,
        _text: &str,
        user_id: &UserId,
        _display_name: &str,
    ) -> Result<String, AssistantError> {
        info!(user_id = %user_id, "AI service not configured, sending fallback reply");
        Ok(self.text.clone())
    }
}

/// Generator backed by the remote assistant service.
pub struct AssistantResponder<S: SessionStore, A: AssistantApi> {
    conversation: ConversationClient<S, A>,
    poller: RunPoller,
    locks: UserLocks,
}

impl<S: SessionStore, A: AssistantApi> AssistantResponder<S, A> {
    pub fn new(conversation: ConversationClient<S, A>, poller: RunPoller) -> Self {
        Self {
            conversation,
            poller,
            locks: UserLocks::new(),
        }
    }

    pub fn conversation(&self) -> &ConversationClient<S, A> {
        &self.conversation
    }

    /// Full reply flow, returning the run and session the reply came from.
    ///
    /// Holds the user's lock from session lookup until the run finishes.
    /// A message that was posted stays posted if the run later fails.
    pub async fn respond(
        &self,
        text: &str,
        user_id: &UserId,
        display_name: &str,
    ) -> Result<GeneratedReply, AssistantError> {
        let _guard = self.locks.acquire(user_id).await;

        let resolved = self.conversation.resolve_session(user_id).await?;
        if resolved.created {
            info!(session_id = %resolved.id, "Creating new thread for {display_name} with wa_id {user_id}");
        } else {
            info!(session_id = %resolved.id, "Retrieving existing thread for {display_name} with wa_id {user_id}");
        }

        let session_id = self.post_with_recovery(resolved, text, user_id).await?;
        let run = self.conversation.start_run(&session_id).await?;
        info!(run_id = %run.id, session_id = %session_id, status = %run.status, "Started run");

        self.poller.await_completion(self.conversation.api(), run).await
    }

    /// Post `text`, replacing a stored session that no longer exists remotely.
    ///
    /// Recovery happens at most once, and never for a session created by this
    /// same request.
    async fn post_with_recovery(
        &self,
        resolved: ResolvedSession,
        text: &str,
        user_id: &UserId,
    ) -> Result<SessionId, AssistantError> {
        match self.conversation.post_message(&resolved.id, text).await {
            Ok(()) => Ok(resolved.id),
            Err(AssistantError::NotFound { resource }) if !resolved.created => {
                warn!(
                    user_id = %user_id,
                    session_id = %resolved.id,
                    %resource,
                    "Stored thread no longer exists, starting a new one"
                );
                let fresh = self.conversation.recreate_session(user_id).await?;
                self.conversation.post_message(&fresh, text).await?;
                Ok(fresh)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S: SessionStore, A: AssistantApi> ReplyGenerator for AssistantResponder<S, A> {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn generate_response(
        &self,
        text: &str,
        user_id: &UserId,
        display_name: &str,
    ) -> Result<String, AssistantError> {
        let span = info_span!(
            "invoke_agent",
            gen_ai.operation.name = "invoke_agent",
            gen_ai.agent.id = self.conversation.assistant_id(),
            user_id = %user_id,
        );

        let reply = self
            .respond(text, user_id, display_name)
            .instrument(span)
            .await?;
        Ok(reply.text)
    }
}
