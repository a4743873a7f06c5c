//! Chat service running the per-request message exchange.
//!
//! `send` moves through `Validating -> BuildingContext -> CallingGateway ->
//! Persisting -> Done`. Side effects are ordered so the gateway call fully
//! succeeds before anything is written: a failed call never leaves a
//! half-written turn behind.

use std::fmt;
use std::time::Instant;

use banter_types::error::ChatError;
use banter_types::llm::{CompletionRequest, GatewayError, Message};
use banter_types::turn::{ChatTurn, SortOrder};
use tracing::{debug, error, field, info, info_span, Instrument};

use crate::chat::context::{validate_message, ContextBuilder};
use crate::llm::gateway::CompletionGateway;
use crate::turn::repository::TurnRepository;

/// Completion parameters fixed for the lifetime of the service.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Stages of a single send; reported when a send fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Validating,
    BuildingContext,
    CallingGateway,
    Persisting,
    Done,
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStage::Validating => write!(f, "validating"),
            SendStage::BuildingContext => write!(f, "building_context"),
            SendStage::CallingGateway => write!(f, "calling_gateway"),
            SendStage::Persisting => write!(f, "persisting"),
            SendStage::Done => write!(f, "done"),
        }
    }
}

/// Orchestrates history reads, context assembly, the completion call, and
/// turn persistence.
///
/// Generic over `TurnRepository` and `CompletionGateway` to maintain clean
/// architecture (banter-core never depends on banter-infra).
pub struct ChatService<R: TurnRepository, G: CompletionGateway> {
    repo: R,
    gateway: G,
    context: ContextBuilder,
    settings: CompletionSettings,
    page_limit: i64,
}

impl<R: TurnRepository, G: CompletionGateway> ChatService<R, G> {
    pub fn new(
        repo: R,
        gateway: G,
        context: ContextBuilder,
        settings: CompletionSettings,
        page_limit: i64,
    ) -> Self {
        Self {
            repo,
            gateway,
            context,
            settings,
            page_limit,
        }
    }

    /// Access the turn repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Access the completion gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// History for the chat page: the last `page_limit` turns, oldest-first.
    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, ChatError> {
        Ok(self
            .repo
            .recent(session_id, self.page_limit, SortOrder::Ascending)
            .await?)
    }

    /// Exchange one user message for an assistant reply and persist the turn.
    pub async fn send(&self, session_id: &str, message: &str) -> Result<ChatTurn, ChatError> {
        let mut stage = SendStage::Validating;
        let result = self.run_send(session_id, message, &mut stage).await;

        match &result {
            Ok(turn) => {
                info!(session_id = %session_id, turn_id = turn.id, stage = %stage, "Message exchanged");
            }
            Err(ChatError::BadRequest(e)) => {
                debug!(session_id = %session_id, stage = %stage, "Message rejected: {e}");
            }
            Err(e) => {
                error!(session_id = %session_id, stage = %stage, "Send failed: {e}");
            }
        }

        result
    }

    async fn run_send(
        &self,
        session_id: &str,
        message: &str,
        stage: &mut SendStage,
    ) -> Result<ChatTurn, ChatError> {
        let user_message = validate_message(message)?;

        *stage = SendStage::BuildingContext;
        let messages = self.context.build(&self.repo, session_id, user_message).await?;

        *stage = SendStage::CallingGateway;
        let ai_response = self.complete(messages).await?;

        *stage = SendStage::Persisting;
        let turn = self.repo.append(session_id, user_message, &ai_response).await?;

        *stage = SendStage::Done;
        Ok(turn)
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, ChatError> {
        if !self.gateway.is_configured() {
            return Err(ChatError::ServiceUnavailable);
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.gateway.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = request.temperature,
            gen_ai.usage.input_tokens = field::Empty,
            gen_ai.usage.output_tokens = field::Empty,
            gen_ai.response.id = field::Empty,
        );

        let start = Instant::now();
        let response = self
            .gateway
            .complete(&request)
            .instrument(span.clone())
            .await
            .map_err(|e| match e {
                GatewayError::MissingCredential => ChatError::ServiceUnavailable,
                other => ChatError::UpstreamFailure(other),
            })?;

        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
        span.record("gen_ai.response.id", response.id.as_str());
        debug!(
            model = %response.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        Ok(response.content)
    }

    /// Delete all turns of a session, returning how many were removed.
    pub async fn clear(&self, session_id: &str) -> Result<u64, ChatError> {
        let deleted = self.repo.clear(session_id).await?;
        info!(session_id = %session_id, deleted, "Chat history cleared");
        Ok(deleted)
    }
}
