use thiserror::Error;

use crate::llm::GatewayError;

/// Errors from Message Store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Input rejected before any store or gateway access.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Invalid JSON data")]
    MalformedPayload(String),
}

/// Classification of a failed request, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    ServiceUnavailable,
    UpstreamFailure,
    StorageFailure,
    InternalFault,
}

impl ErrorKind {
    /// HTTP-style status: 400 for client input faults, 500 for everything else.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            _ => 500,
        }
    }
}

/// Terminal error of a chat operation.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    BadRequest(#[from] ValidationError),

    #[error("Completion API key not configured")]
    ServiceUnavailable,

    #[error("AI service error: {0}")]
    UpstreamFailure(#[from] GatewayError),

    #[error("Database error: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("An unexpected error occurred: {0}")]
    InternalFault(String),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::BadRequest(_) => ErrorKind::BadRequest,
            ChatError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            ChatError::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            ChatError::StorageFailure(_) => ErrorKind::StorageFailure,
            ChatError::InternalFault(_) => ErrorKind::InternalFault,
        }
    }
}
