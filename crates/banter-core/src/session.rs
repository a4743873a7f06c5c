//! Session Identity Provider.
//!
//! Binds a browser session to one opaque conversation id. The session state
//! itself (storage, expiry, cookie issuance) belongs to the caller; this
//! module only needs to read and write a single key in it.

use banter_types::error::StorageError;
use uuid::Uuid;

/// Key under which the conversation id is kept in session state.
pub const SESSION_ID_KEY: &str = "session_id";

/// Minimal view of server-side session state.
///
/// Implementations provide their own interior synchronization. `insert`
/// must be durable for as long as the session lives.
pub trait SessionState: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    fn insert(
        &self,
        key: &str,
        value: String,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Return the session's conversation id, creating one on first contact.
///
/// Idempotent within one session: once stored, the id is returned unchanged
/// and never rotated. New ids are random UUID v4 tokens.
pub async fn resolve<S: SessionState>(state: &S) -> Result<String, StorageError> {
    if let Some(existing) = state.get(SESSION_ID_KEY).await? {
        return Ok(existing);
    }

    let session_id = Uuid::new_v4().to_string();
    state.insert(SESSION_ID_KEY, session_id.clone()).await?;
    tracing::debug!(session_id = %session_id, "New conversation session");
    Ok(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySessionState;

    #[tokio::test]
    async fn test_resolve_creates_and_stores_id() {
        let state = InMemorySessionState::default();
        let id = resolve(&state).await.unwrap();
        assert_eq!(
            state.get(SESSION_ID_KEY).await.unwrap().as_deref(),
            Some(id.as_str())
        );
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let state = InMemorySessionState::default();
        let first = resolve(&state).await.unwrap();
        let second = resolve(&state).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_returns_existing_unchanged() {
        let state = InMemorySessionState::default();
        state.insert(SESSION_ID_KEY, "abc".to_string()).await.unwrap();
        assert_eq!(resolve(&state).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_distinct_sessions_get_distinct_ids() {
        let a = InMemorySessionState::default();
        let b = InMemorySessionState::default();
        assert_ne!(resolve(&a).await.unwrap(), resolve(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_propagates_write_failure() {
        let state = InMemorySessionState::default();
        state.fail_writes(true);
        let err = resolve(&state).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
        assert!(state.get(SESSION_ID_KEY).await.unwrap().is_none());
    }
}
