//! Chat turn handler.
//!
//! Endpoint:
//! - POST /api/v1/chat - Run one conversation turn

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use parley_types::chat::ChatReply;
use parley_types::llm::TurnMessage;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a chat turn: the client resubmits the whole thread
/// plus the newest user message, and the session id once it has one.
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub messages: Vec<TurnMessage>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// POST /api/v1/chat - Run one conversation turn.
///
/// Returns the assistant reply, the session id (freshly minted on the
/// first turn), and whether the turn was persisted; `persisted: false`
/// means the reply is real but history was not saved.
pub async fn converse(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let reply = state
        .chat_service
        .converse(&request.messages, &user_id, request.session_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(reply, request_id, elapsed)))
}
