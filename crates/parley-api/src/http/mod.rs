//! REST API layer: router, envelope responses, error mapping, extractors,
//! and handlers.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
