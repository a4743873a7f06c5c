//! BoxCompletionGateway -- object-safe dynamic dispatch wrapper for CompletionGateway.
//!
//! 1. Define an object-safe `CompletionGatewayDyn` trait with boxed futures
//! 2. Blanket-impl `CompletionGatewayDyn` for all `T: CompletionGateway`
//! 3. `BoxCompletionGateway` wraps `Box<dyn CompletionGatewayDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use banter_types::llm::{CompletionRequest, CompletionResponse, GatewayError};

use super::gateway::CompletionGateway;

/// Object-safe version of [`CompletionGateway`] with boxed futures.
pub trait CompletionGatewayDyn: Send + Sync {
    fn name(&self) -> &str;

    fn is_configured(&self) -> bool;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, GatewayError>> + Send + 'a>>;
}

impl<T: CompletionGateway> CompletionGatewayDyn for T {
    fn name(&self) -> &str {
        CompletionGateway::name(self)
    }

    fn is_configured(&self) -> bool {
        CompletionGateway::is_configured(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, GatewayError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased completion gateway.
///
/// Lets the application state hold the real HTTP gateway in production and a
/// stub in router tests without changing its type.
pub struct BoxCompletionGateway {
    inner: Box<dyn CompletionGatewayDyn>,
}

impl BoxCompletionGateway {
    /// Wrap a concrete `CompletionGateway` in a type-erased box.
    pub fn new<T: CompletionGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }
}

impl CompletionGateway for BoxCompletionGateway {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        self.inner.complete_boxed(request).await
    }
}
