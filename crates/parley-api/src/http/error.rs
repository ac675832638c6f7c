//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use parley_types::error::{ChatError, IdentityError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat turn failures surfaced to the caller.
    Chat(ChatError),
    /// Identity provider failures.
    Identity(IdentityError),
    /// Authentication failure on a protected route.
    Unauthorized(String),
    /// Request validation error.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        AppError::Identity(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(ChatError::EmptyConversation) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Conversation contains no messages".to_string(),
            ),
            AppError::Chat(ChatError::UpstreamUnavailable(msg)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
                format!("Completion service unavailable: {msg}"),
            ),
            AppError::Chat(ChatError::EmptyCompletion) => (
                StatusCode::BAD_GATEWAY,
                "EMPTY_COMPLETION",
                "Completion service returned no usable text".to_string(),
            ),
            AppError::Chat(ChatError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "Completion service timed out".to_string(),
            ),
            AppError::Identity(IdentityError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Identity(IdentityError::EmailInUse) => (
                StatusCode::CONFLICT,
                "EMAIL_IN_USE",
                "Email already in use".to_string(),
            ),
            AppError::Identity(IdentityError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token".to_string(),
            ),
            AppError::Identity(IdentityError::Unavailable(msg)) => (
                StatusCode::BAD_GATEWAY,
                "IDENTITY_UNAVAILABLE",
                format!("Identity provider unavailable: {msg}"),
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, axum::Json(body)).into_response()
    }
}
