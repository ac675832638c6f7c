//! Chat session and message types.
//!
//! A session is one conversation thread, uniquely identified by
//! `(id, user_id)`. Messages are append-only and ordered by insertion;
//! the store assigns message identity, so callers never supply ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from the llm module (used in both contexts).
pub use crate::llm::MessageRole;

/// One conversation thread owned by a single user.
///
/// `created_at` is set on first insert and never changes; `updated_at` is
/// touched on every append and drives both recency listing and retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

/// A single stored message within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a completed chat turn.
///
/// `persisted` distinguishes "reply produced and saved" from "reply
/// produced but the store write failed" so the client can warn the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub session_id: Uuid,
    pub persisted: bool,
}
