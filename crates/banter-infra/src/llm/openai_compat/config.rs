//! Configuration for OpenAI-compatible completion services.

use std::time::Duration;

use banter_types::config::CompletionConfig;
use secrecy::SecretString;

/// Settings for an [`super::OpenAiCompatibleGateway`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "groq").
    pub provider_name: String,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer credential; `None` leaves the gateway unconfigured.
    pub api_key: Option<SecretString>,
    /// Transport timeout for one call.
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    pub fn from_completion(config: &CompletionConfig, api_key: Option<SecretString>) -> Self {
        Self {
            provider_name: config.provider_name.clone(),
            base_url: config.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Groq default configuration.
///
/// Base URL: `https://api.groq.com/openai/v1`
pub fn groq_defaults(api_key: Option<SecretString>) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "groq".into(),
        base_url: "https://api.groq.com/openai/v1".into(),
        api_key,
        timeout: Duration::from_secs(60),
    }
}
