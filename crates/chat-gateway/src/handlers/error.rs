//! Handler error types

use chat_service::ServiceError;
use thiserror::Error;

/// Handler error type
///
/// None of these close the socket: the offending frame is logged and the
/// connection stays open.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame is not valid JSON or lacks required fields
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Connection vanished from the registry while handling
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Outbound queue closed before a reply could be queued
    #[error("Connection closed")]
    Closed,
}

impl HandlerError {
    /// Whether the client sent something the server cannot act on
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Malformed(_) | Self::UnknownMethod(_) => true,
            Self::Service(e) => e.is_not_found() || e.is_validation(),
            Self::UnknownSession(_) | Self::Closed => false,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
