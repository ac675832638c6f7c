//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! ChatService is generic over repository/provider traits; AppState pins
//! it to the SQLite repository and the Gemini completion client.

use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use parley_core::chat::sanitizer::Sanitizer;
use parley_core::chat::service::ChatService;
use parley_infra::config::{load_config, resolve_data_dir};
use parley_infra::identity::HttpIdentityGateway;
use parley_infra::llm::gemini::GeminiProvider;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::session::SqliteSessionRepository;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteSessionRepository, GeminiProvider>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub identity: Arc<HttpIdentityGateway>,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    ///
    /// Upstream API keys come from `PARLEY_COMPLETION_API_KEY` and
    /// `PARLEY_IDENTITY_API_KEY`; both collaborators are unusable without
    /// them, so a missing key fails startup rather than the first request.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("parley.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let completion_key = SecretString::from(
            std::env::var("PARLEY_COMPLETION_API_KEY")
                .context("PARLEY_COMPLETION_API_KEY is not set")?,
        );
        let identity_key = SecretString::from(
            std::env::var("PARLEY_IDENTITY_API_KEY")
                .context("PARLEY_IDENTITY_API_KEY is not set")?,
        );

        let repo = SqliteSessionRepository::new(db_pool);
        let provider = GeminiProvider::new(completion_key, &config.completion)?;
        let sanitizer = Sanitizer::new(&config.sanitizer.rules)?;

        let chat_service = ChatService::new(
            repo,
            provider,
            sanitizer,
            config.completion.model.clone(),
            config.retention.clone(),
        );

        let identity = HttpIdentityGateway::new(identity_key, &config.identity)?;

        Ok(Self {
            chat_service: Arc::new(chat_service),
            identity: Arc::new(identity),
        })
    }
}
