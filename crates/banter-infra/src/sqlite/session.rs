//! SQLite-backed browser sessions.
//!
//! Browsers hold only an opaque token (a UUID v4 in a cookie); the session
//! values live in the `sessions` table as a JSON object, so sessions survive
//! restarts. Sessions idle longer than the configured timeout are treated as
//! absent and swept whenever a new session is created.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use banter_core::session::SessionState;
use banter_types::error::StorageError;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime};

/// Shared session store. Cloning is cheap and shares the same pool.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: DatabasePool,
    idle_timeout: TimeDelta,
}

impl SqliteSessionStore {
    pub fn new(pool: DatabasePool, idle_timeout: Duration) -> Self {
        let idle_timeout = TimeDelta::from_std(idle_timeout).unwrap_or(TimeDelta::MAX);
        Self { pool, idle_timeout }
    }

    /// Sessions last seen before this instant are expired.
    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(self.idle_timeout)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Look up the session for `token`, or start a new one.
    ///
    /// Returns the session and whether it is new (the caller must then issue
    /// the token to the client). Unknown and expired tokens both yield a
    /// fresh session under a fresh token.
    pub async fn load_or_create(
        &self,
        token: Option<&str>,
    ) -> Result<(SqliteSession, bool), StorageError> {
        if let Some(token) = token {
            if let Some(session) = self.load(token).await? {
                return Ok((session, false));
            }
        }

        let swept = self.purge_expired().await?;
        if swept > 0 {
            tracing::debug!(swept, "Evicted idle sessions");
        }

        let token = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (token, data, last_seen) VALUES (?, '{}', ?)")
            .bind(&token)
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok((self.session(token, HashMap::new()), true))
    }

    /// Load a live session and refresh its `last_seen`.
    async fn load(&self, token: &str) -> Result<Option<SqliteSession>, StorageError> {
        let row = sqlx::query("SELECT data, last_seen FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row.try_get("data").map_err(map_sqlx_error)?;
        let last_seen: String = row.try_get("last_seen").map_err(map_sqlx_error)?;

        if parse_datetime(&last_seen)? < self.cutoff() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool.writer)
                .await
                .map_err(map_sqlx_error)?;
            tracing::debug!("Session expired; issuing a new one");
            return Ok(None);
        }

        let values: HashMap<String, String> = serde_json::from_str(&data)
            .map_err(|e| StorageError::Query(format!("invalid session data: {e}")))?;

        sqlx::query("UPDATE sessions SET last_seen = ? WHERE token = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(token)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Some(self.session(token.to_string(), values)))
    }

    /// Remove every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM sessions WHERE last_seen < ?")
            .bind(format_datetime(&self.cutoff()))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    /// Number of stored sessions, live or not yet swept.
    pub async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    fn session(&self, token: String, values: HashMap<String, String>) -> SqliteSession {
        SqliteSession {
            token,
            values: Mutex::new(values),
            pool: self.pool.clone(),
        }
    }
}

/// One browser session: the values loaded for a request, written through
/// to the `sessions` row on every insert.
pub struct SqliteSession {
    token: String,
    values: Mutex<HashMap<String, String>>,
    pool: DatabasePool,
}

impl SqliteSession {
    /// Opaque token to send back in the session cookie.
    pub fn token(&self) -> &str {
        &self.token
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionState for SqliteSession {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot().get(key).cloned())
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut values = self.snapshot();
        values.insert(key.to_string(), value);
        let data = serde_json::to_string(&values)
            .map_err(|e| StorageError::Query(format!("invalid session data: {e}")))?;

        sqlx::query(
            r#"INSERT INTO sessions (token, data, last_seen) VALUES (?, ?, ?)
               ON CONFLICT(token) DO UPDATE SET data = excluded.data, last_seen = excluded.last_seen"#,
        )
        .bind(&self.token)
        .bind(&data)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        *self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = values;
        Ok(())
    }
}
