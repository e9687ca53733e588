//! Conversation client: session resolution, message posting, run start.
//!
//! Composes a [`SessionStore`] with an [`AssistantApi`]. Also provides
//! [`UserLocks`], the per-user mutual exclusion used by the responder so that
//! concurrent requests from one user cannot race on the store.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use wabridge_types::assistant::{AssistantError, Run};
use wabridge_types::session::{SessionId, UserId};

use crate::assistant::api::AssistantApi;
use crate::storage::session_store::SessionStore;

/// A session id together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub id: SessionId,
    /// True when the session was created by this call rather than loaded.
    pub created: bool,
}

/// Per-user session bookkeeping on top of the remote assistant service.
///
/// Generic over `SessionStore` and `AssistantApi` to keep wabridge-core free
/// of infrastructure dependencies.
pub struct ConversationClient<S: SessionStore, A: AssistantApi> {
    store: S,
    api: A,
    assistant_id: Option<String>,
}

impl<S: SessionStore, A: AssistantApi> ConversationClient<S, A> {
    pub fn new(store: S, api: A, assistant_id: Option<String>) -> Self {
        Self {
            store,
            api,
            assistant_id,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn assistant_id(&self) -> Option<&str> {
        self.assistant_id.as_deref()
    }

    /// Return the user's session, creating and persisting one if absent.
    ///
    /// A stored id is returned as-is, without checking that it still exists
    /// remotely.
    pub async fn get_or_create_session(&self, user_id: &UserId) -> Result<SessionId, AssistantError> {
        Ok(self.resolve_session(user_id).await?.id)
    }

    /// Like [`Self::get_or_create_session`], but reports whether the session is new.
    pub async fn resolve_session(&self, user_id: &UserId) -> Result<ResolvedSession, AssistantError> {
        if let Some(id) = self.store.lookup(user_id).await? {
            return Ok(ResolvedSession { id, created: false });
        }

        let id = self.api.create_session().await?;
        self.store.save(user_id, &id).await?;
        info!(user_id = %user_id, session_id = %id, "Created session");
        Ok(ResolvedSession { id, created: true })
    }

    /// Create a fresh remote session and overwrite the user's mapping.
    pub async fn recreate_session(&self, user_id: &UserId) -> Result<SessionId, AssistantError> {
        let id = self.api.create_session().await?;
        self.store.save(user_id, &id).await?;
        info!(user_id = %user_id, session_id = %id, "Replaced stale session");
        Ok(id)
    }

    /// Append a user message to the session.
    pub async fn post_message(&self, session_id: &SessionId, text: &str) -> Result<(), AssistantError> {
        self.api.post_message(session_id, text).await
    }

    /// Start a generation run over everything posted so far.
    ///
    /// Fails with `MissingAssistantId` before any network call when no
    /// assistant is configured.
    pub async fn start_run(&self, session_id: &SessionId) -> Result<Run, AssistantError> {
        let assistant_id = self
            .assistant_id
            .as_deref()
            .ok_or(AssistantError::MissingAssistantId)?;
        self.api.start_run(session_id, assistant_id).await
    }
}

/// Lazily created async mutex per user.
///
/// Entries are never evicted; there is one per user that has ever written,
/// mirroring the session store itself.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s session.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
