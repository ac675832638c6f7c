//! Chat orchestrator: validate, complete, sanitize, persist, prune.
//!
//! ChatService wires the completion provider, the sanitizer, and the
//! session repository into a single `converse` call, and carries the
//! fail-open list/delete wrappers the HTTP layer consumes.

use tracing::{error, info, warn};
use uuid::Uuid;

use parley_types::chat::{ChatReply, ChatSession};
use parley_types::config::RetentionPolicy;
use parley_types::error::{ChatError, LlmError};
use parley_types::llm::{CompletionRequest, MessageRole, TurnMessage};

use crate::chat::repository::SessionRepository;
use crate::chat::sanitizer::Sanitizer;
use crate::llm::provider::CompletionProvider;

/// Orchestrates a chat turn end to end.
///
/// Generic over `SessionRepository` and `CompletionProvider` so
/// parley-core never depends on parley-infra.
pub struct ChatService<R: SessionRepository, P: CompletionProvider> {
    repo: R,
    provider: P,
    sanitizer: Sanitizer,
    model: String,
    retention: RetentionPolicy,
}

impl<R: SessionRepository, P: CompletionProvider> ChatService<R, P> {
    pub fn new(
        repo: R,
        provider: P,
        sanitizer: Sanitizer,
        model: String,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            repo,
            provider,
            sanitizer,
            model,
            retention,
        }
    }

    /// Run one conversation turn.
    ///
    /// The most recent entry of `prior` is the prompt. On success the
    /// whole prior list plus the new assistant message is appended to the
    /// session -- deliberately denormalized, matching the upsert-append
    /// document shape; message identity is reassigned per insert, so
    /// repeated content across turns is accepted rather than deduplicated.
    ///
    /// A completion failure aborts the turn. A persistence failure does
    /// not: the reply is still returned, flagged `persisted: false`, and
    /// the store error is logged.
    pub async fn converse(
        &self,
        prior: &[TurnMessage],
        user_id: &str,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, ChatError> {
        let prompt = prior.last().ok_or(ChatError::EmptyConversation)?;

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.content.clone(),
        };
        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| match e {
                LlmError::Timeout => ChatError::Timeout,
                other => ChatError::UpstreamUnavailable(other.to_string()),
            })?;

        if response.content.trim().is_empty() {
            return Err(ChatError::EmptyCompletion);
        }

        let content = self.sanitizer.sanitize(&response.content);

        let mut turn = prior.to_vec();
        turn.push(TurnMessage {
            role: MessageRole::Assistant,
            content: content.clone(),
        });

        match self.repo.append_turn(session_id, user_id, &turn).await {
            Ok(session) => {
                self.sweep(user_id).await;
                Ok(ChatReply {
                    content,
                    session_id: session.id,
                    persisted: true,
                })
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "failed to persist chat turn");
                Ok(ChatReply {
                    content,
                    session_id: session_id.unwrap_or_else(Uuid::now_v7),
                    persisted: false,
                })
            }
        }
    }

    /// Best-effort retention sweep after a successful append.
    async fn sweep(&self, user_id: &str) {
        match self.repo.enforce_retention(&self.retention, user_id).await {
            Ok(0) => {}
            Ok(deleted) => info!(deleted, "retention sweep pruned sessions"),
            Err(e) => warn!(error = %e, "retention sweep failed"),
        }
    }

    /// List a user's most recent sessions.
    ///
    /// Fails open: a store error yields an empty list so the client shell
    /// still renders; the error itself goes to telemetry, not the caller.
    pub async fn list_recent(&self, user_id: &str, limit: i64) -> Vec<ChatSession> {
        match self.repo.list_recent(user_id, limit).await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "failed to list sessions");
                Vec::new()
            }
        }
    }

    /// Delete one of the user's sessions.
    ///
    /// Returns whether a session was removed; a store error is logged and
    /// reported as `false`.
    pub async fn delete_session(&self, session_id: &Uuid, user_id: &str) -> bool {
        match self.repo.delete_session(session_id, user_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "failed to delete session");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parley_types::chat::ChatMessage;
    use parley_types::config::SanitizerRule;
    use parley_types::error::RepositoryError;
    use parley_types::llm::CompletionResponse;
    use std::sync::Mutex;

    // --- test doubles ---

    #[derive(Default)]
    struct MemoryRepo {
        sessions: Mutex<Vec<ChatSession>>,
        fail: bool,
        retention_fail: bool,
    }

    impl MemoryRepo {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn session_count(&self) -> usize {
            self.sessions.lock().unwrap().len()
        }
    }

    impl SessionRepository for MemoryRepo {
        async fn append_turn(
            &self,
            session_id: Option<Uuid>,
            user_id: &str,
            messages: &[TurnMessage],
        ) -> Result<ChatSession, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            let now = Utc::now();
            let mut sessions = self.sessions.lock().unwrap();
            let existing = session_id.and_then(|sid| {
                sessions
                    .iter_mut()
                    .find(|s| s.id == sid && s.user_id == user_id)
            });
            let stored: Vec<ChatMessage> = messages
                .iter()
                .map(|m| ChatMessage {
                    id: Uuid::now_v7(),
                    role: m.role,
                    content: m.content.clone(),
                    created_at: now,
                })
                .collect();
            match existing {
                Some(session) => {
                    session.messages.extend(stored);
                    session.updated_at = now;
                    Ok(session.clone())
                }
                None => {
                    let session = ChatSession {
                        id: Uuid::now_v7(),
                        user_id: user_id.to_string(),
                        created_at: now,
                        updated_at: now,
                        messages: stored,
                    };
                    sessions.push(session.clone());
                    Ok(session)
                }
            }
        }

        async fn list_recent(
            &self,
            user_id: &str,
            limit: i64,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            let mut sessions: Vec<ChatSession> = self
                .sessions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect();
            sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            sessions.truncate(limit as usize);
            Ok(sessions)
        }

        async fn delete_session(
            &self,
            session_id: &Uuid,
            user_id: &str,
        ) -> Result<bool, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            let mut sessions = self.sessions.lock().unwrap();
            let before = sessions.len();
            sessions.retain(|s| !(s.id == *session_id && s.user_id == user_id));
            Ok(sessions.len() < before)
        }

        async fn enforce_retention(
            &self,
            _policy: &RetentionPolicy,
            _user_id: &str,
        ) -> Result<u64, RepositoryError> {
            if self.retention_fail {
                return Err(RepositoryError::Connection);
            }
            Ok(0)
        }
    }

    enum ProviderBehavior {
        Reply(&'static str),
        Fail,
        TimeOut,
    }

    struct StubProvider {
        behavior: ProviderBehavior,
    }

    impl CompletionProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match self.behavior {
                ProviderBehavior::Reply(text) => Ok(CompletionResponse {
                    content: text.to_string(),
                    model: request.model.clone(),
                }),
                ProviderBehavior::Fail => Err(LlmError::Provider {
                    message: "connection refused".to_string(),
                }),
                ProviderBehavior::TimeOut => Err(LlmError::Timeout),
            }
        }
    }

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(&[
            SanitizerRule {
                pattern: "Gemini".to_string(),
                replacement: "Parley".to_string(),
                case_insensitive: true,
            },
            SanitizerRule {
                pattern: "Google".to_string(),
                replacement: "Parley Labs".to_string(),
                case_insensitive: true,
            },
        ])
        .unwrap()
    }

    fn service(
        repo: MemoryRepo,
        behavior: ProviderBehavior,
    ) -> ChatService<MemoryRepo, StubProvider> {
        ChatService::new(
            repo,
            StubProvider { behavior },
            sanitizer(),
            "test-model".to_string(),
            RetentionPolicy::default(),
        )
    }

    fn user_says(content: &str) -> Vec<TurnMessage> {
        vec![TurnMessage {
            role: MessageRole::User,
            content: content.to_string(),
        }]
    }

    // --- tests ---

    #[tokio::test]
    async fn test_empty_conversation_rejected_without_store_mutation() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Reply("hi"));
        let err = svc.converse(&[], "user1", None).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));
        assert_eq!(svc.repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_converse_sanitizes_and_mints_session() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Reply("Gemini says hi from Google"));
        let reply = svc.converse(&user_says("hello"), "user1", None).await.unwrap();

        assert_eq!(reply.content, "Parley says hi from Parley Labs");
        assert!(reply.persisted);

        let sessions = svc.list_recent("user1", 25).await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, reply.session_id);
        // user prompt plus assistant reply, in order
        assert_eq!(sessions[0].messages.len(), 2);
        assert_eq!(sessions[0].messages[0].role, MessageRole::User);
        assert_eq!(sessions[0].messages[1].role, MessageRole::Assistant);
        assert_eq!(sessions[0].messages[1].content, "Parley says hi from Parley Labs");
    }

    #[tokio::test]
    async fn test_converse_appends_full_history() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Reply("second answer"));
        let first = svc.converse(&user_says("first"), "user1", None).await.unwrap();

        // The client resubmits the whole thread each turn; the append is
        // the full list plus the new assistant message.
        let prior = vec![
            TurnMessage {
                role: MessageRole::User,
                content: "first".to_string(),
            },
            TurnMessage {
                role: MessageRole::Assistant,
                content: "second answer".to_string(),
            },
            TurnMessage {
                role: MessageRole::User,
                content: "follow-up".to_string(),
            },
        ];
        let second = svc
            .converse(&prior, "user1", Some(first.session_id))
            .await
            .unwrap();
        assert_eq!(second.session_id, first.session_id);

        let sessions = svc.list_recent("user1", 25).await;
        assert_eq!(sessions.len(), 1);
        // 2 from the first turn + 4 from the second (3 prior + 1 assistant)
        assert_eq!(sessions[0].messages.len(), 6);
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_no_session() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Fail);
        let err = svc.converse(&user_says("hello"), "user1", None).await.unwrap_err();
        assert!(matches!(err, ChatError::UpstreamUnavailable(_)));
        assert!(svc.list_recent("user1", 25).await.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_timeout_maps_to_timeout() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::TimeOut);
        let err = svc.converse(&user_says("hello"), "user1", None).await.unwrap_err();
        assert!(matches!(err, ChatError::Timeout));
    }

    #[tokio::test]
    async fn test_blank_completion_rejected() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Reply("   \n"));
        let err = svc.converse(&user_says("hello"), "user1", None).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_store_failure_still_returns_reply() {
        let svc = service(MemoryRepo::failing(), ProviderBehavior::Reply("Gemini here"));
        let reply = svc.converse(&user_says("hello"), "user1", None).await.unwrap();
        assert_eq!(reply.content, "Parley here");
        assert!(!reply.persisted);
    }

    #[tokio::test]
    async fn test_retention_failure_does_not_fail_turn() {
        let repo = MemoryRepo {
            retention_fail: true,
            ..Default::default()
        };
        let svc = service(repo, ProviderBehavior::Reply("fine"));
        let reply = svc.converse(&user_says("hello"), "user1", None).await.unwrap();
        assert!(reply.persisted);
    }

    #[tokio::test]
    async fn test_list_recent_fails_open() {
        let svc = service(MemoryRepo::failing(), ProviderBehavior::Reply("hi"));
        assert!(svc.list_recent("user1", 25).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_session_fails_closed_to_false() {
        let svc = service(MemoryRepo::failing(), ProviderBehavior::Reply("hi"));
        assert!(!svc.delete_session(&Uuid::now_v7(), "user1").await);
    }

    #[tokio::test]
    async fn test_delete_session_idempotent() {
        let svc = service(MemoryRepo::default(), ProviderBehavior::Reply("hi"));
        let reply = svc.converse(&user_says("hello"), "user1", None).await.unwrap();

        assert!(svc.delete_session(&reply.session_id, "user1").await);
        assert!(!svc.delete_session(&reply.session_id, "user1").await);
    }
}
