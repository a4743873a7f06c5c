//! In-memory fakes for the capability traits.
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! downstream crates. Nothing here touches disk or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use banter_types::error::StorageError;
use banter_types::llm::{CompletionRequest, CompletionResponse, GatewayError, Usage};
use banter_types::turn::{
    normalize_session_id, ChatTurn, SessionSummary, SortOrder, TurnFilter,
};
use chrono::Utc;

use crate::llm::gateway::CompletionGateway;
use crate::session::SessionState;
use crate::turn::repository::TurnRepository;

/// Vector-backed `TurnRepository` with read/write counters and an injectable
/// write fault.
#[derive(Default)]
pub struct InMemoryTurnRepository {
    turns: Mutex<Vec<ChatTurn>>,
    next_id: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryTurnRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StorageError::Query`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of read operations served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful write operations.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Query("simulated write failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn session_turns(&self, session_id: &str) -> Vec<ChatTurn> {
        let session_id = normalize_session_id(session_id);
        let turns = self.turns.lock().unwrap();
        let mut matching: Vec<ChatTurn> = turns
            .iter()
            .filter(|t| t.session_id == session_id)
            .cloned()
            .collect();
        matching.sort_by_key(|t| (t.timestamp, t.id));
        matching
    }
}

impl TurnRepository for InMemoryTurnRepository {
    async fn append(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
    ) -> Result<ChatTurn, StorageError> {
        self.check_writable()?;
        if user_message.is_empty() {
            return Err(StorageError::Query("user_message must not be empty".to_string()));
        }

        let turn = ChatTurn {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1,
            user_message: user_message.to_string(),
            ai_response: ai_response.to_string(),
            timestamp: Utc::now(),
            session_id: normalize_session_id(session_id).to_string(),
        };
        self.turns.lock().unwrap().push(turn.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(turn)
    }

    async fn recent(
        &self,
        session_id: &str,
        limit: i64,
        order: SortOrder,
    ) -> Result<Vec<ChatTurn>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let turns = self.session_turns(session_id);
        let skip = turns.len().saturating_sub(limit.max(0) as usize);
        let mut window: Vec<ChatTurn> = turns.into_iter().skip(skip).collect();
        if order == SortOrder::Descending {
            window.reverse();
        }
        Ok(window)
    }

    async fn clear(&self, session_id: &str) -> Result<u64, StorageError> {
        self.check_writable()?;
        let session_id = normalize_session_id(session_id);
        let mut turns = self.turns.lock().unwrap();
        let before = turns.len();
        turns.retain(|t| t.session_id != session_id);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok((before - turns.len()) as u64)
    }

    async fn count(&self, session_id: &str) -> Result<u64, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.session_turns(session_id).len() as u64)
    }

    async fn list(&self, filter: &TurnFilter) -> Result<Vec<ChatTurn>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut turns: Vec<ChatTurn> = self
            .turns
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                filter
                    .session_id
                    .as_deref()
                    .is_none_or(|s| t.session_id == normalize_session_id(s))
            })
            .filter(|t| {
                needle.as_deref().is_none_or(|n| {
                    t.user_message.to_lowercase().contains(n)
                        || t.ai_response.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        turns.sort_by_key(|t| std::cmp::Reverse((t.timestamp, t.id)));
        if let Some(limit) = filter.limit {
            turns.truncate(limit.max(0) as usize);
        }
        Ok(turns)
    }

    async fn sessions(&self) -> Result<Vec<SessionSummary>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut by_session: HashMap<String, SessionSummary> = HashMap::new();
        for turn in self.turns.lock().unwrap().iter() {
            let entry = by_session
                .entry(turn.session_id.clone())
                .or_insert_with(|| SessionSummary {
                    session_id: turn.session_id.clone(),
                    turn_count: 0,
                    last_activity: turn.timestamp,
                });
            entry.turn_count += 1;
            entry.last_activity = entry.last_activity.max(turn.timestamp);
        }
        let mut summaries: Vec<SessionSummary> = by_session.into_values().collect();
        summaries.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(summaries)
    }
}

/// HashMap-backed `SessionState` with an injectable write fault.
#[derive(Default)]
pub struct InMemorySessionState {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemorySessionState {
    /// Make every subsequent `insert` fail with a connection error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SessionState for InMemorySessionState {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("session store unavailable".into()));
        }
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

type ErrorFactory = Box<dyn Fn() -> GatewayError + Send + Sync>;

enum StubReply {
    Text(String),
    Error(ErrorFactory),
}

/// Deterministic `CompletionGateway` that counts calls and records the last
/// request it received.
pub struct StubGateway {
    configured: bool,
    reply: StubReply,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl StubGateway {
    /// A configured gateway that always answers with `text`.
    pub fn replying(text: &str) -> Self {
        Self {
            configured: true,
            reply: StubReply::Text(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// A configured gateway whose every call fails with the produced error.
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> GatewayError + Send + Sync + 'static,
    {
        Self {
            reply: StubReply::Error(Box::new(make_error)),
            ..Self::replying("")
        }
    }

    /// A gateway with no credential.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::failing(|| GatewayError::MissingCredential)
        }
    }

    /// Shared handle to the call counter; survives boxing the stub.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared handle to the last request seen.
    pub fn last_request_handle(&self) -> Arc<Mutex<Option<CompletionRequest>>> {
        Arc::clone(&self.last_request)
    }
}

impl CompletionGateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            StubReply::Text(text) => Ok(CompletionResponse {
                id: format!("stub-{}", self.calls.load(Ordering::SeqCst)),
                content: text.clone(),
                model: request.model.clone(),
                finish_reason: Some("stop".to_string()),
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            StubReply::Error(make_error) => Err(make_error()),
        }
    }
}
