//! HttpIdentityGateway -- concrete [`IdentityGateway`] for an
//! Identity-Toolkit-style REST identity provider.
//!
//! Parley never stores credentials; every operation is a thin typed call
//! against the provider's `accounts:*` endpoints, with the provider's
//! error codes mapped onto the [`IdentityError`] taxonomy. The project
//! API key rides in a header wrapped in [`secrecy::SecretString`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use parley_core::auth::gateway::IdentityGateway;
use parley_types::config::IdentityConfig;
use parley_types::error::IdentityError;
use parley_types::identity::{AuthSession, UserIdentity};

/// HTTP client for the external identity provider.
// Intentionally no Debug derive: keeps the API key out of any formatting path.
pub struct HttpIdentityGateway {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl HttpIdentityGateway {
    pub fn new(api_key: SecretString, config: &IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
        })
    }

    /// Override the base URL (useful for tests and proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, op: &str) -> String {
        format!("{}/v1/accounts:{op}", self.base_url)
    }

    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let response = self
            .client
            .post(self.url(op))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_provider_error(status.as_u16(), &error_body));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("failed to parse response: {e}")))
    }
}

/// Map a provider error payload (`{"error": {"message": "CODE"}}`) onto
/// the identity error taxonomy.
fn map_provider_error(status: u16, body: &str) -> IdentityError {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: Option<ErrorBody>,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    let code = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .unwrap_or_default();

    // Codes may carry a trailing detail, e.g. "INVALID_PASSWORD : ...".
    let code = code.split_whitespace().next().unwrap_or("");

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "USER_DISABLED" => {
            IdentityError::InvalidToken
        }
        other if !other.is_empty() => IdentityError::Unavailable(other.to_string()),
        _ => IdentityError::Unavailable(format!("HTTP {status}")),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
}

impl AuthResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            identity: UserIdentity {
                user_id: self.local_id,
                email: self.email,
                display_name: self.display_name,
            },
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct SignOutResponse {}

// ---------------------------------------------------------------------------
// IdentityGateway implementation
// ---------------------------------------------------------------------------

impl IdentityGateway for HttpIdentityGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signInWithPassword",
                &PasswordSignInRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into_session())
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthSession, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signUp",
                &SignUpRequest {
                    email,
                    password,
                    display_name,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into_session())
    }

    async fn login_federated(&self, provider_token: &str) -> Result<AuthSession, IdentityError> {
        let response: AuthResponse = self
            .post(
                "signInWithIdp",
                &IdpSignInRequest {
                    post_body: format!("id_token={provider_token}&providerId=google.com"),
                    request_uri: "http://localhost",
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into_session())
    }

    async fn sign_out(&self, id_token: &str) -> Result<(), IdentityError> {
        let _: SignOutResponse = self.post("signOut", &TokenRequest { id_token }).await?;
        Ok(())
    }

    async fn update_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<UserIdentity, IdentityError> {
        let response: UpdateProfileResponse = self
            .post(
                "update",
                &UpdateProfileRequest {
                    id_token,
                    display_name,
                    return_secure_token: false,
                },
            )
            .await?;
        Ok(UserIdentity {
            user_id: response.local_id,
            email: response.email,
            display_name: response.display_name,
        })
    }

    async fn verify_token(&self, id_token: &str) -> Result<UserIdentity, IdentityError> {
        let response: LookupResponse = self.post("lookup", &TokenRequest { id_token }).await?;
        let user = response
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::InvalidToken)?;
        Ok(UserIdentity {
            user_id: user.local_id,
            email: user.email,
            display_name: user.display_name,
        })
    }
}
