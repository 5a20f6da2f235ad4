use serde::{Deserialize, Serialize};

/// Body the game server attaches to every non-success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Parses a raw response body, returning the server's message when it is present and non-blank.
    pub fn message_from_body(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        let trimmed = parsed.error.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
