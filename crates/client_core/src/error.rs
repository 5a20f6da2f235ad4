use thiserror::Error;

use crate::gateway::Operation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// HTTP error status, transport fault or timeout. The session is left untouched.
    #[error("Error {}: {message}", operation.activity())]
    RequestFailed {
        operation: Operation,
        message: String,
    },
    /// Rejected before dispatch; no request was sent.
    #[error("{0}")]
    ValidationRejected(String),
    #[error("no game in progress; start or resume a game first")]
    NoSession,
    #[error("still waiting on the previous {pending} request")]
    Busy { pending: &'static str },
    #[error("game controller is not running")]
    Disconnected,
}

impl ClientError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::ValidationRejected(message.into())
    }

    pub fn request_failed(operation: Operation, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation,
            message: message.into(),
        }
    }
}
