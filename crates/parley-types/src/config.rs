//! Application configuration for Parley.
//!
//! Deserialized from `config.toml` in the data directory. Every section
//! has defaults so a missing or partial file still yields a working
//! configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub retention: RetentionPolicy,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Session retention policy, applied after every append.
///
/// Two variants are supported; exactly one is configured:
///
/// ```toml
/// [retention]
/// policy = "keep_recent"
/// max_sessions = 25
/// per_user = false
/// ```
///
/// ```toml
/// [retention]
/// policy = "max_age"
/// max_age_days = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Retain only the N most-recently-updated sessions, globally or per
    /// appending user.
    KeepRecent {
        #[serde(default = "default_max_sessions")]
        max_sessions: u32,
        #[serde(default)]
        per_user: bool,
    },
    /// Delete sessions whose updated_at is older than the given age.
    MaxAge { max_age_days: u32 },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::KeepRecent {
            max_sessions: default_max_sessions(),
            per_user: false,
        }
    }
}

fn default_max_sessions() -> u32 {
    25
}

/// Rule table for the response sanitizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<SanitizerRule>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

/// One whole-word substitution applied to completion output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerRule {
    /// Source term, matched at word boundaries only.
    pub pattern: String,
    /// Literal replacement text (may differ in length).
    pub replacement: String,
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
}

/// Default brand rewrite: upstream vendor and model names become the
/// product's own branding.
fn default_rules() -> Vec<SanitizerRule> {
    vec![
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
    ]
}

fn default_true() -> bool {
    true
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    /// Upstream request timeout; bounds turn latency (there is no retry).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_completion_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_completion_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Identity provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_base_url(),
        }
    }
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}
