//! Application error type mapping chat failures to HTTP responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with status 400 for
//! client input faults and 500 for everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use banter_types::error::{ChatError, ErrorKind, StorageError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A failed page render or send.
    Chat(ChatError),
    /// A failed history clear; reported with its own wording.
    Clear(ChatError),
    /// Template rendering failure.
    Render(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Chat(ChatError::StorageFailure(e))
    }
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        AppError::Render(e.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Chat(e) => match e.kind() {
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Clear(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Chat(e) => e.to_string(),
            AppError::Clear(ChatError::StorageFailure(cause)) => {
                format!("Error clearing chat: {cause}")
            }
            AppError::Clear(e) => format!("Error clearing chat: {e}"),
            AppError::Render(msg) => format!("An unexpected error occurred: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_types::error::ValidationError;
    use banter_types::llm::GatewayError;

    #[test]
    fn bad_request_maps_to_400() {
        let err = AppError::from(ChatError::from(ValidationError::EmptyMessage));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Message cannot be empty");
    }

    #[test]
    fn missing_key_maps_to_500() {
        let err = AppError::from(ChatError::ServiceUnavailable);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Completion API key not configured");
    }

    #[test]
    fn upstream_failure_carries_cause() {
        let err = AppError::from(ChatError::from(GatewayError::Timeout("30s".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "AI service error: request timed out: 30s");
    }

    #[test]
    fn session_store_failure_maps_to_500() {
        let err = AppError::from(StorageError::Connection("pool timed out".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, AppError::Chat(ChatError::StorageFailure(_))));
    }

    #[test]
    fn clear_failure_wording() {
        let err = AppError::Clear(ChatError::from(StorageError::Query("disk I/O error".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Error clearing chat: query error: disk I/O error");
    }
}
