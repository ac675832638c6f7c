//! Identity types returned by the external identity provider.
//!
//! Parley does not store credentials or issue tokens; the only thing the
//! core depends on is the stable `user_id` string used to scope sessions.

use serde::{Deserialize, Serialize};

/// A verified user identity as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable opaque identifier; scopes all session operations.
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// An identity-provider session: the verified identity plus the tokens
/// the client holds for subsequent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub identity: UserIdentity,
    /// Bearer token presented on authenticated API calls.
    pub id_token: String,
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_session_serialize() {
        let session = AuthSession {
            identity: UserIdentity {
                user_id: "uid-1".to_string(),
                email: Some("a@b.c".to_string()),
                display_name: None,
            },
            id_token: "tok".to_string(),
            refresh_token: None,
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"user_id\":\"uid-1\""));
        assert!(json.contains("\"id_token\":\"tok\""));
    }
}
