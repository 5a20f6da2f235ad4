//! Front-end error model: controller failures sorted into categories for display.

use client_core::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// Server unreachable, timed out, or sent something undecodable.
    Transport,
    Validation,
    /// The server refused the action under the game rules.
    Game,
    Session,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    message: String,
}

impl UiError {
    pub fn from_client_error(err: &ClientError) -> Self {
        let category = match err {
            ClientError::RequestFailed { message, .. } => classify_request_failure(message),
            ClientError::ValidationRejected(_) => UiErrorCategory::Validation,
            ClientError::NoSession | ClientError::Busy { .. } => UiErrorCategory::Session,
            ClientError::Disconnected => UiErrorCategory::Unknown,
        };
        Self {
            category,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.category == UiErrorCategory::Transport
    }
}

fn classify_request_failure(message: &str) -> UiErrorCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out")
        || lower.contains("could not reach")
        || lower.contains("connection")
        || lower.contains("unexpected response")
    {
        UiErrorCategory::Transport
    } else if lower.contains("not found") || lower.contains("invalid token") {
        UiErrorCategory::Session
    } else if lower.is_empty() {
        UiErrorCategory::Unknown
    } else {
        UiErrorCategory::Game
    }
}
