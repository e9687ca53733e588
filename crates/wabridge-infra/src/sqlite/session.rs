//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `wabridge-core` over the `user_sessions`
//! table. Lookups go to the reader pool, upserts to the single writer.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use wabridge_core::storage::session_store::SessionStore;
use wabridge_types::error::RepositoryError;
use wabridge_types::session::{SessionId, SessionRecord, UserId};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    user_id: String,
    session_id: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            session_id: row.try_get("session_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<SessionRecord, RepositoryError> {
        Ok(SessionRecord {
            user_id: UserId(self.user_id),
            session_id: SessionId(self.session_id),
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn db_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<SessionId>, RepositoryError> {
        let row = sqlx::query("SELECT session_id FROM user_sessions WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let session_id: String = row.try_get("session_id").map_err(db_error)?;
                Ok(Some(SessionId(session_id)))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: &UserId, session_id: &SessionId) -> Result<(), RepositoryError> {
        // Fixed-width timestamps keep lexical order equal to time order.
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            r#"INSERT INTO user_sessions (user_id, session_id, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (user_id) DO UPDATE SET session_id = excluded.session_id, updated_at = excluded.updated_at"#,
        )
        .bind(user_id.as_str())
        .bind(session_id.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn get_record(&self, user_id: &UserId) -> Result<Option<SessionRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_sessions WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => SessionRow::from_row(&row)
                .map_err(db_error)?
                .into_record()
                .map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<SessionRecord>, RepositoryError> {
        // SQLite treats a negative LIMIT as unbounded.
        let rows = sqlx::query(
            "SELECT * FROM user_sessions ORDER BY updated_at DESC, user_id ASC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| SessionRow::from_row(row).map_err(db_error)?.into_record())
            .collect()
    }
}
