//! SessionRepository trait definition.
//!
//! Persistence abstraction over the session collection. Sessions are
//! always scoped to `(session_id, user_id)`; no operation can touch
//! another user's thread.

use parley_types::chat::ChatSession;
use parley_types::config::RetentionPolicy;
use parley_types::error::RepositoryError;
use parley_types::llm::TurnMessage;
use uuid::Uuid;

/// Repository trait for chat session persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteSessionRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SessionRepository: Send + Sync {
    /// Append a turn's messages to a session, creating it if needed.
    ///
    /// When `session_id` is `None`, or names no session owned by
    /// `user_id`, a fresh identifier is minted and a new session created.
    /// The session upsert and message inserts must run as one atomic
    /// write so concurrent appends to the same session never interleave
    /// partial turns. Returns the full updated session with messages.
    fn append_turn(
        &self,
        session_id: Option<Uuid>,
        user_id: &str,
        messages: &[TurnMessage],
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// List a user's sessions ordered by updated_at DESC, at most `limit`.
    fn list_recent(
        &self,
        user_id: &str,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Delete a session scoped to `(session_id, user_id)`.
    ///
    /// Returns whether a session was removed. Deleting a session that
    /// does not exist returns `Ok(false)`, not an error.
    fn delete_session(
        &self,
        session_id: &Uuid,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Apply the retention policy, returning the number of sessions deleted.
    ///
    /// `user_id` identifies the appending user for per-user policies;
    /// global policies ignore it.
    fn enforce_retention(
        &self,
        policy: &RetentionPolicy,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
