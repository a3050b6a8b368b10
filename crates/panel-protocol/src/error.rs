use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unexpected object: expected `{expected}`, found `{found}`")]
    UnexpectedObject { expected: String, found: String },

    #[error("Malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error response body.
/// Wire: `{ "errors": [ { "code": "ValidationException", "status": "422", "detail": "..." } ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub detail: String,
}

impl ErrorBody {
    /// The message a user should see: the first non-empty `detail`.
    pub fn first_detail(&self) -> Option<&str> {
        self.errors
            .first()
            .map(|e| e.detail.as_str())
            .filter(|d| !d.trim().is_empty())
    }

    /// Extract a human message from a raw error response body, if it has one.
    pub fn human_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.first_detail().map(str::to_string))
    }
}
