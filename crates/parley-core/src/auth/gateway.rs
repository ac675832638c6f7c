//! IdentityGateway trait definition.
//!
//! Login, registration, federated login, sign-out, and profile updates
//! are all delegated to a hosted identity provider. Credential storage
//! and token issuance are the provider's concern; the rest of the system
//! only ever consumes the stable `user_id` it reports.

use parley_types::error::IdentityError;
use parley_types::identity::{AuthSession, UserIdentity};

/// Trait for the external identity provider.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra (e.g., `HttpIdentityGateway`).
pub trait IdentityGateway: Send + Sync {
    /// Email/password sign-in.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthSession, IdentityError>> + Send;

    /// Email/password registration, optionally setting a display name.
    fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl std::future::Future<Output = Result<AuthSession, IdentityError>> + Send;

    /// Exchange a federated provider credential for an identity session.
    fn login_federated(
        &self,
        provider_token: &str,
    ) -> impl std::future::Future<Output = Result<AuthSession, IdentityError>> + Send;

    /// Invalidate the holder's refresh tokens at the provider.
    fn sign_out(
        &self,
        id_token: &str,
    ) -> impl std::future::Future<Output = Result<(), IdentityError>> + Send;

    /// Update the account's display name.
    fn update_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<UserIdentity, IdentityError>> + Send;

    /// Resolve a bearer token to the identity it belongs to.
    fn verify_token(
        &self,
        id_token: &str,
    ) -> impl std::future::Future<Output = Result<UserIdentity, IdentityError>> + Send;
}
