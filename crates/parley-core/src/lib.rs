//! Business logic for Parley.
//!
//! Defines the async traits (native async fn in traits, RPITIT) that
//! parley-infra implements -- session persistence, the completion
//! provider, the identity gateway -- plus the pure sanitizer and the
//! ChatService orchestrator. This crate never depends on parley-infra.

pub mod auth;
pub mod chat;
pub mod llm;
