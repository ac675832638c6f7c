//! Shared domain types for Parley.
//!
//! This crate holds the data shapes passed between parley-core,
//! parley-infra, and parley-api: chat sessions and messages, completion
//! request/response types, identity types, configuration, and the error
//! taxonomy. No I/O happens here.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
