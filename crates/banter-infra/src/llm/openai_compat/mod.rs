//! OpenAI-compatible completion gateway.
//!
//! A single [`OpenAiCompatibleGateway`] talks to any service exposing the
//! OpenAI `/chat/completions` endpoint (Groq by default) with bearer auth.
//! Requests are always non-streaming and each call is exactly one HTTP
//! attempt.

pub mod config;
pub mod types;

use secrecy::{ExposeSecret, SecretString};

use banter_core::llm::gateway::CompletionGateway;
use banter_types::llm::{CompletionRequest, CompletionResponse, GatewayError, Usage};

use self::config::OpenAiCompatConfig;
use self::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, WireMessage};

/// Gateway for OpenAI-compatible chat-completion services.
///
/// Does not derive Debug; the API key only leaves its [`SecretString`] when
/// the Authorization header is built.
pub struct OpenAiCompatibleGateway {
    client: reqwest::Client,
    provider_name: String,
    base_url: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompatibleGateway {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider_name: config.provider_name,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_wire_request(request: &CompletionRequest) -> ChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: Some(m.content.clone()),
            })
            .collect();

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

/// Classify a transport-level reqwest failure.
fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Classify a non-2xx status with its body.
fn map_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 => GatewayError::Authentication,
        429 => GatewayError::RateLimited,
        _ => {
            let message = serde_json::from_str::<ErrorEnvelope>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.to_string());
            GatewayError::Provider { status, message }
        }
    }
}

/// Parse a 2xx body into the single reply.
fn parse_completion(body: &str) -> Result<CompletionResponse, GatewayError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(GatewayError::EmptyResponse)?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(GatewayError::EmptyResponse)?;

    let usage = parsed
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: parsed.id,
        content,
        model: parsed.model,
        finish_reason: choice.finish_reason,
        usage,
    })
}

impl CompletionGateway for OpenAiCompatibleGateway {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingCredential)?;
        let body = Self::to_wire_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), provider = %self.provider_name, "completion request rejected");
            return Err(map_status(status.as_u16(), &text));
        }

        parse_completion(&text)
    }
}
