//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.
//!
//! In production, the built chat SPA is served from `web/dist/`
//! (configurable via `PARLEY_WEB_DIR`). API routes take priority; unknown
//! paths fall through to the SPA's `index.html` for client-side routing.
//! If the directory does not exist, only the API is served.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat turn
        .route("/chat", post(handlers::chat::converse))
        // Sessions
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        // Account management (pass-throughs to the identity provider)
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/federated", post(handlers::auth::login_federated))
        .route("/auth/signout", post(handlers::auth::sign_out))
        .route(
            "/profile/display-name",
            put(handlers::auth::update_display_name),
        );

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built SPA from disk if the directory exists. API routes
    // and /health take priority; unknown paths fall through to index.html
    // for client-side routing.
    let web_dir = std::env::var("PARLEY_WEB_DIR").unwrap_or_else(|_| "web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{}/index.html", web_dir);
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
