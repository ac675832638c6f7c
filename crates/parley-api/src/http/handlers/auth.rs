//! Account management handlers, all pass-throughs to the identity provider.
//!
//! Endpoints:
//! - POST /api/v1/auth/login        - Email/password sign-in
//! - POST /api/v1/auth/register     - Email/password registration
//! - POST /api/v1/auth/federated    - Federated (IdP credential) sign-in
//! - POST /api/v1/auth/signout      - Invalidate the caller's tokens
//! - PUT  /api/v1/profile/display-name - Update the account display name

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use parley_core::auth::gateway::IdentityGateway;
use parley_types::identity::{AuthSession, UserIdentity};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FederatedRequest {
    /// Credential obtained from the federated provider on the client.
    pub provider_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SignOutRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDisplayNameRequest {
    pub id_token: String,
    pub display_name: String,
}

/// POST /api/v1/auth/login - Email/password sign-in.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .identity
        .login(&request.email, &request.password)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session, request_id, elapsed)))
}

/// POST /api/v1/auth/register - Email/password registration.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .identity
        .register(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session, request_id, elapsed)))
}

/// POST /api/v1/auth/federated - Exchange a federated provider credential.
pub async fn login_federated(
    State(state): State<AppState>,
    Json(request): Json<FederatedRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .identity
        .login_federated(&request.provider_token)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session, request_id, elapsed)))
}

/// POST /api/v1/auth/signout - Invalidate the caller's tokens at the provider.
pub async fn sign_out(
    State(state): State<AppState>,
    Json(request): Json<SignOutRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.identity.sign_out(&request.id_token).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "signed_out": true }),
        request_id,
        elapsed,
    )))
}

/// PUT /api/v1/profile/display-name - Update the account display name.
pub async fn update_display_name(
    State(state): State<AppState>,
    Json(request): Json<UpdateDisplayNameRequest>,
) -> Result<Json<ApiResponse<UserIdentity>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if request.display_name.trim().is_empty() {
        return Err(AppError::Validation("Display name must not be empty".to_string()));
    }

    let identity = state
        .identity
        .update_display_name(&request.id_token, request.display_name.trim())
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(identity, request_id, elapsed)))
}
