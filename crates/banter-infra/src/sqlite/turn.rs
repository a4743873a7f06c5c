//! SQLite turn repository implementation.
//!
//! Implements `TurnRepository` from `banter-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, reader pool for
//! SELECTs, writer pool for INSERT/DELETE.

use banter_core::turn::repository::TurnRepository;
use banter_types::error::StorageError;
use banter_types::turn::{
    normalize_session_id, ChatTurn, SessionSummary, SortOrder, TurnFilter,
};
use chrono::{SubsecRound, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime};

/// SQLite-backed implementation of `TurnRepository`.
pub struct SqliteTurnRepository {
    pool: DatabasePool,
}

impl SqliteTurnRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatTurnRow {
    id: i64,
    user_message: String,
    ai_response: String,
    timestamp: String,
    session_id: String,
}

impl ChatTurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_message: row.try_get("user_message")?,
            ai_response: row.try_get("ai_response")?,
            timestamp: row.try_get("timestamp")?,
            session_id: row.try_get("session_id")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, StorageError> {
        Ok(ChatTurn {
            id: self.id,
            user_message: self.user_message,
            ai_response: self.ai_response,
            timestamp: parse_datetime(&self.timestamp)?,
            session_id: self.session_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Escape `%`, `_` and `\` so user search text matches literally in LIKE.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn rows_to_turns(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatTurn>, StorageError> {
    let mut turns = Vec::with_capacity(rows.len());
    for row in rows {
        let turn_row = ChatTurnRow::from_row(row).map_err(map_sqlx_error)?;
        turns.push(turn_row.into_turn()?);
    }
    Ok(turns)
}

// ---------------------------------------------------------------------------
// TurnRepository implementation
// ---------------------------------------------------------------------------

impl TurnRepository for SqliteTurnRepository {
    async fn append(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
    ) -> Result<ChatTurn, StorageError> {
        let session_id = normalize_session_id(session_id);
        // Truncate to the stored precision so the returned turn equals what
        // a later read yields.
        let timestamp = Utc::now().trunc_subsecs(6);

        let result = sqlx::query(
            r#"INSERT INTO chat_turns (user_message, ai_response, timestamp, session_id)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(user_message)
        .bind(ai_response)
        .bind(format_datetime(&timestamp))
        .bind(session_id)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(ChatTurn {
            id: result.last_insert_rowid(),
            user_message: user_message.to_string(),
            ai_response: ai_response.to_string(),
            timestamp,
            session_id: session_id.to_string(),
        })
    }

    async fn recent(
        &self,
        session_id: &str,
        limit: i64,
        order: SortOrder,
    ) -> Result<Vec<ChatTurn>, StorageError> {
        // The inner query picks the newest `limit` rows; the outer one
        // applies the requested order.
        let sql = format!(
            r#"SELECT * FROM (
                   SELECT * FROM chat_turns WHERE session_id = ?
                   ORDER BY timestamp DESC, id DESC LIMIT ?
               ) ORDER BY timestamp {dir}, id {dir}"#,
            dir = order.as_sql()
        );

        let rows = sqlx::query(&sql)
            .bind(normalize_session_id(session_id))
            .bind(limit.max(0))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        rows_to_turns(&rows)
    }

    async fn clear(&self, session_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM chat_turns WHERE session_id = ?")
            .bind(normalize_session_id(session_id))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn count(&self, session_id: &str) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM chat_turns WHERE session_id = ?")
            .bind(normalize_session_id(session_id))
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn list(&self, filter: &TurnFilter) -> Result<Vec<ChatTurn>, StorageError> {
        let mut sql = String::from("SELECT * FROM chat_turns WHERE 1 = 1");

        if filter.session_id.is_some() {
            sql.push_str(" AND session_id = ?");
        }
        if filter.search.is_some() {
            sql.push_str(
                r" AND (user_message LIKE ? ESCAPE '\' OR ai_response LIKE ? ESCAPE '\')",
            );
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let mut query = sqlx::query(&sql);
        if let Some(session_id) = &filter.session_id {
            query = query.bind(normalize_session_id(session_id).to_string());
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        rows_to_turns(&rows)
    }

    async fn sessions(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let rows = sqlx::query(
            r#"SELECT session_id, COUNT(*) AS turn_count, MAX(timestamp) AS last_activity
               FROM chat_turns
               GROUP BY session_id
               ORDER BY last_activity DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_id: String = row.try_get("session_id").map_err(map_sqlx_error)?;
            let turn_count: i64 = row.try_get("turn_count").map_err(map_sqlx_error)?;
            let last_activity: String = row.try_get("last_activity").map_err(map_sqlx_error)?;
            summaries.push(SessionSummary {
                session_id,
                turn_count: turn_count as u64,
                last_activity: parse_datetime(&last_activity)?,
            });
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::{default_database_url, DatabasePool};

    async fn test_repo() -> SqliteTurnRepository {
        let dir = tempfile::tempdir().unwrap();
        let url = default_database_url(dir.path());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        SqliteTurnRepository::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_append_then_recent_returns_inserted_turn() {
        let repo = test_repo().await;

        let inserted = repo.append("s1", "hi", "hello").await.unwrap();
        let turns = repo.recent("s1", 20, SortOrder::Ascending).await.unwrap();

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0], inserted);
        assert_eq!(inserted.session_id, "s1");
        assert!(inserted.id > 0);
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let repo = test_repo().await;
        let a = repo.append("s1", "one", "1").await.unwrap();
        let b = repo.append("s2", "two", "2").await.unwrap();
        let c = repo.append("s1", "three", "3").await.unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[tokio::test]
    async fn test_recent_orders_and_bounds() {
        let repo = test_repo().await;
        for i in 0..7 {
            repo.append("s1", &format!("q{i}"), &format!("a{i}")).await.unwrap();
        }

        let asc = repo.recent("s1", 5, SortOrder::Ascending).await.unwrap();
        let asc_msgs: Vec<&str> = asc.iter().map(|t| t.user_message.as_str()).collect();
        assert_eq!(asc_msgs, vec!["q2", "q3", "q4", "q5", "q6"]);

        let desc = repo.recent("s1", 3, SortOrder::Descending).await.unwrap();
        let desc_msgs: Vec<&str> = desc.iter().map(|t| t.user_message.as_str()).collect();
        assert_eq!(desc_msgs, vec!["q6", "q5", "q4"]);
    }

    #[tokio::test]
    async fn test_recent_unknown_session_is_empty() {
        let repo = test_repo().await;
        let turns = repo.recent("nobody", 20, SortOrder::Ascending).await.unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_session() {
        let repo = test_repo().await;
        repo.append("s1", "a", "b").await.unwrap();
        repo.append("s1", "c", "d").await.unwrap();
        repo.append("s2", "e", "f").await.unwrap();

        assert_eq!(repo.clear("s1").await.unwrap(), 2);
        assert!(repo.recent("s1", 20, SortOrder::Ascending).await.unwrap().is_empty());
        assert_eq!(repo.count("s2").await.unwrap(), 1);

        // Clearing an empty session is not an error.
        assert_eq!(repo.clear("s1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_user_message_is_rejected() {
        let repo = test_repo().await;
        let err = repo.append("s1", "", "reply").await.unwrap_err();
        assert!(matches!(err, StorageError::Query(_)));
        assert_eq!(repo.count("s1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_session_id_uses_default_bucket() {
        let repo = test_repo().await;
        let turn = repo.append("", "hi", "hello").await.unwrap();
        assert_eq!(turn.session_id, "default");
        assert_eq!(repo.count("default").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let repo = test_repo().await;
        repo.append("s1", "Tell me about Rust", "Rust is a language").await.unwrap();
        repo.append("s2", "Weather?", "Sunny").await.unwrap();
        repo.append("s1", "More on rust please", "Ownership...").await.unwrap();

        let all = repo.list(&TurnFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].user_message, "More on rust please");

        let s1 = repo
            .list(&TurnFilter {
                session_id: Some("s1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(s1.len(), 2);

        let rust = repo
            .list(&TurnFilter {
                search: Some("RUST".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rust.len(), 1);
        assert_eq!(rust[0].user_message, "More on rust please");

        let sunny = repo
            .list(&TurnFilter {
                search: Some("sunny".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sunny.len(), 1);
        assert_eq!(sunny[0].session_id, "s2");
    }

    #[tokio::test]
    async fn test_list_search_is_literal() {
        let repo = test_repo().await;
        repo.append("s1", "100% sure", "ok").await.unwrap();
        repo.append("s1", "1000 things", "ok").await.unwrap();

        let hits = repo
            .list(&TurnFilter {
                search: Some("0%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_message, "100% sure");
    }

    #[tokio::test]
    async fn test_sessions_summary() {
        let repo = test_repo().await;
        repo.append("s1", "a", "b").await.unwrap();
        repo.append("s2", "c", "d").await.unwrap();
        repo.append("s2", "e", "f").await.unwrap();

        let sessions = repo.sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "s2");
        assert_eq!(sessions[0].turn_count, 2);
        assert_eq!(sessions[1].turn_count, 1);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
    }

    #[tokio::test]
    async fn test_padded_session_ids_are_distinct_buckets() {
        let repo = test_repo().await;
        repo.append("s1", "plain", "a").await.unwrap();
        repo.append(" s1", "padded", "b").await.unwrap();

        assert_eq!(repo.count("s1").await.unwrap(), 1);
        assert_eq!(repo.count(" s1").await.unwrap(), 1);
        let padded = repo.recent(" s1", 20, SortOrder::Ascending).await.unwrap();
        assert_eq!(padded[0].user_message, "padded");
        assert_eq!(padded[0].session_id, " s1");
    }

    #[test]
    fn test_format_datetime_fixed_width() {
        let dt = chrono::DateTime::parse_from_rfc3339("2025-01-01T00:00:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_datetime(&dt), "2025-01-01T00:00:05.000000Z");
    }
}
