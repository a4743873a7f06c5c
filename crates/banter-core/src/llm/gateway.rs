//! CompletionGateway trait definition.
//!
//! The single boundary to the external chat-completion service. Tests swap
//! in a deterministic stub; nothing in the test suite touches the network.

use banter_types::llm::{CompletionRequest, CompletionResponse, GatewayError};

/// Trait for chat-completion backends.
///
/// Implementations live in banter-infra (e.g., `OpenAiCompatibleGateway`).
pub trait CompletionGateway: Send + Sync {
    /// Human-readable backend name (e.g., "groq").
    fn name(&self) -> &str;

    /// Whether a credential is present. Checked before any network call.
    fn is_configured(&self) -> bool;

    /// Send the role-tagged context and return the single generated reply.
    ///
    /// Exactly one attempt is made; failures are classified, never retried.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, GatewayError>> + Send;
}
