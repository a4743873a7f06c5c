//! TurnRepository trait definition.
//!
//! The Message Store exclusively owns `ChatTurn` persistence; nothing above
//! it caches turns across requests.

use banter_types::error::StorageError;
use banter_types::turn::{ChatTurn, SessionSummary, SortOrder, TurnFilter};

/// Repository trait for chat turn persistence.
///
/// Implementations live in banter-infra (e.g., `SqliteTurnRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait TurnRepository: Send + Sync {
    /// Insert one complete turn. The store assigns `id` and `timestamp`.
    fn append(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
    ) -> impl std::future::Future<Output = Result<ChatTurn, StorageError>> + Send;

    /// The most recent `limit` turns of a session, returned in `order`.
    ///
    /// An unknown or empty session yields an empty vector, not an error.
    fn recent(
        &self,
        session_id: &str,
        limit: i64,
        order: SortOrder,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, StorageError>> + Send;

    /// Delete every turn of a session, returning how many were removed.
    fn clear(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, StorageError>> + Send;

    /// Number of turns stored for a session.
    fn count(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, StorageError>> + Send;

    /// Administrative listing across sessions, newest-first.
    fn list(
        &self,
        filter: &TurnFilter,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, StorageError>> + Send;

    /// Per-session aggregates, most recently active first.
    fn sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, StorageError>> + Send;
}
