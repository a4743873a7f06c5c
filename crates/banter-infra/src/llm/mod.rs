//! Completion gateway implementations.
//!
//! Contains the concrete [`CompletionGateway`] used at runtime and a factory
//! ([`create_gateway`]) that builds it from [`CompletionConfig`], boxed so the
//! application state can hold it next to test stubs.
//!
//! [`CompletionGateway`]: banter_core::llm::gateway::CompletionGateway

pub mod openai_compat;

use banter_core::llm::box_gateway::BoxCompletionGateway;
use banter_types::config::CompletionConfig;
use banter_types::llm::GatewayError;

use crate::config::read_api_key;

use self::openai_compat::config::OpenAiCompatConfig;
use self::openai_compat::OpenAiCompatibleGateway;

/// Create a [`BoxCompletionGateway`] from the completion config.
///
/// The API key is read once, here. A missing key does not fail; the gateway
/// reports `is_configured() == false` and every send is rejected before
/// the network is touched.
pub fn create_gateway(config: &CompletionConfig) -> Result<BoxCompletionGateway, GatewayError> {
    let api_key = read_api_key(&config.api_key_env);
    if api_key.is_none() {
        tracing::warn!(
            env = %config.api_key_env,
            "completion API key not set; /send/ will report it as not configured"
        );
    }

    let gateway = OpenAiCompatibleGateway::new(OpenAiCompatConfig::from_completion(config, api_key))?;
    Ok(BoxCompletionGateway::new(gateway))
}
