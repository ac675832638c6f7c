//! Infrastructure implementations for Parley.
//!
//! Concrete backends for the traits defined in parley-core: SQLite
//! session persistence, the hosted completion-service client, and the
//! identity-provider client, plus configuration loading.

pub mod config;
pub mod identity;
pub mod llm;
pub mod sqlite;
