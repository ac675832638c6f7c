use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from the completion service client.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors surfaced to the caller of a chat turn.
///
/// Persistence failures are deliberately absent: a store error after a
/// successful completion is logged and reported via `ChatReply::persisted`,
/// never as a turn failure.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation contains no messages")]
    EmptyConversation,

    #[error("completion service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("completion service returned no usable text")]
    EmptyCompletion,

    #[error("completion service timed out")]
    Timeout,
}

/// Errors from the external identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already in use")]
    EmailInUse,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::UpstreamUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(
            ChatError::EmptyConversation.to_string(),
            "conversation contains no messages"
        );
    }

    #[test]
    fn test_identity_error_display() {
        assert_eq!(
            IdentityError::EmailInUse.to_string(),
            "email already in use"
        );
    }
}
