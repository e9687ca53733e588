//! Session store trait.
//!
//! Defines the interface for the durable `UserId -> SessionId` mapping.
//! Implementations live in wabridge-infra.

use wabridge_types::error::RepositoryError;
use wabridge_types::session::{SessionId, SessionRecord, UserId};

/// Trait for the persistent user-to-session mapping.
///
/// Holds at most one session per user. No locking discipline is implied:
/// concurrent `save` calls for the same user are last-writer-wins, so callers
/// that need exclusivity must serialize per user themselves.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait SessionStore: Send + Sync {
    /// Look up the session for a user. Returns None if the user has none yet.
    fn lookup(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<SessionId>, RepositoryError>> + Send;

    /// Map a user to a session (upsert, replacing any previous mapping).
    fn save(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the full record including timestamps.
    fn get_record(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<SessionRecord>, RepositoryError>> + Send;

    /// List records, most recently updated first.
    fn list(
        &self,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<SessionRecord>, RepositoryError>> + Send;
}
