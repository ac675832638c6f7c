//! CompletionProvider trait definition.
//!
//! The hosted text-completion API is an opaque collaborator: one prompt
//! in, one completion out, as a blocking async call. There is no
//! streaming and no implicit retry -- a failed call surfaces immediately.

use parley_types::error::LlmError;
use parley_types::llm::{CompletionRequest, CompletionResponse};

/// Trait for completion service backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra (e.g., `GeminiProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and receive the full completion text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
