//! Bearer-token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to a user id
//! through the external identity provider. Token issuance and credential
//! storage are the provider's concern; the only thing this layer trusts
//! is the `user_id` the provider reports, which then scopes every
//! session operation.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use parley_core::auth::gateway::IdentityGateway;
use parley_types::error::IdentityError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated user id. Extracting this verifies the bearer token.
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let identity = state.identity.verify_token(&token).await.map_err(|e| match e {
            IdentityError::Unavailable(_) => AppError::Identity(e),
            _ => AppError::Unauthorized(
                "Invalid or expired token. Provide a valid 'Authorization: Bearer <token>' header."
                    .to_string(),
            ),
        })?;

        Ok(AuthUser(identity.user_id))
    }
}

/// Extract the bearer token from request headers.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(AppError::Unauthorized(
            "Missing token. Provide via 'Authorization: Bearer <token>' header.".to_string(),
        ));
    };

    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AppError::Unauthorized(
            "Malformed Authorization header; expected 'Bearer <token>'".to_string(),
        )),
    }
}
