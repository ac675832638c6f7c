//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `parley-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, RFC 3339
//! datetimes stored as TEXT. The append path runs inside a single write
//! transaction so a turn's messages land atomically.

use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_core::chat::repository::SessionRepository;
use parley_types::chat::{ChatMessage, ChatSession, MessageRole};
use parley_types::config::RetentionPolicy;
use parley_types::error::RepositoryError;
use parley_types::llm::TurnMessage;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Fetch a session row and hydrate its full message list.
    async fn hydrate(
        &self,
        session_id: &Uuid,
        user_id: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ? AND user_id = ?")
            .bind(session_id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let session_row = SessionRow::from_row(&row).map_err(map_sqlx_error)?;

        // rowid breaks ties within a single turn's batch insert, where
        // every message shares one created_at.
        let message_rows = sqlx::query(
            "SELECT * FROM messages WHERE session_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut messages = Vec::with_capacity(message_rows.len());
        for row in &message_rows {
            let msg_row = MessageRow::from_row(row).map_err(map_sqlx_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(Some(session_row.into_session(messages)?))
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self, messages: Vec<ChatMessage>) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(ChatSession {
            id,
            user_id: self.user_id,
            created_at,
            updated_at,
            messages,
        })
    }
}

struct MessageRow {
    id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ChatMessage {
            id,
            role,
            content: self.content,
            created_at,
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

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn append_turn(
        &self,
        session_id: Option<Uuid>,
        user_id: &str,
        messages: &[TurnMessage],
    ) -> Result<ChatSession, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;

        // Reuse the id only when it names a session this user owns;
        // anything else (absent, unknown, another user's) mints a fresh one.
        let sid = match session_id {
            Some(sid) => {
                let owned = sqlx::query("SELECT id FROM sessions WHERE id = ? AND user_id = ?")
                    .bind(sid.to_string())
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?;
                if owned.is_some() { sid } else { Uuid::now_v7() }
            }
            None => Uuid::now_v7(),
        };

        // MAX keeps updated_at monotonic even if the wall clock steps back.
        sqlx::query(
            r#"INSERT INTO sessions (id, user_id, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (id) DO UPDATE
               SET updated_at = MAX(sessions.updated_at, excluded.updated_at)"#,
        )
        .bind(sid.to_string())
        .bind(user_id)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for message in messages {
            sqlx::query(
                r#"INSERT INTO messages (id, session_id, role, content, created_at)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::now_v7().to_string())
            .bind(sid.to_string())
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(format_datetime(&now))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        self.hydrate(&sid, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id FROM sessions WHERE user_id = ? ORDER BY updated_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id").map_err(map_sqlx_error)?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
            if let Some(session) = self.hydrate(&id, user_id).await? {
                sessions.push(session);
            }
        }

        Ok(sessions)
    }

    async fn delete_session(
        &self,
        session_id: &Uuid,
        user_id: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND user_id = ?")
            .bind(session_id.to_string())
            .bind(user_id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn enforce_retention(
        &self,
        policy: &RetentionPolicy,
        user_id: &str,
    ) -> Result<u64, RepositoryError> {
        let result = match policy {
            RetentionPolicy::KeepRecent {
                max_sessions,
                per_user: true,
            } => {
                sqlx::query(
                    r#"DELETE FROM sessions
                       WHERE user_id = ?1
                         AND id NOT IN (
                             SELECT id FROM sessions WHERE user_id = ?1
                             ORDER BY updated_at DESC LIMIT ?2
                         )"#,
                )
                .bind(user_id)
                .bind(i64::from(*max_sessions))
                .execute(&self.pool.writer)
                .await
            }
            RetentionPolicy::KeepRecent {
                max_sessions,
                per_user: false,
            } => {
                sqlx::query(
                    r#"DELETE FROM sessions
                       WHERE id NOT IN (
                           SELECT id FROM sessions
                           ORDER BY updated_at DESC LIMIT ?
                       )"#,
                )
                .bind(i64::from(*max_sessions))
                .execute(&self.pool.writer)
                .await
            }
            RetentionPolicy::MaxAge { max_age_days } => {
                let cutoff = Utc::now() - Duration::days(i64::from(*max_age_days));
                sqlx::query("DELETE FROM sessions WHERE updated_at < ?")
                    .bind(format_datetime(&cutoff))
                    .execute(&self.pool.writer)
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
