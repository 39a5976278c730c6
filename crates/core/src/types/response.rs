//! Generic acknowledgement body.

use serde::{Deserialize, Serialize};

/// `{code, type, message}` body used for errors and stub acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ApiResponse {
    /// Build a response body.
    #[must_use]
    pub fn new(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: kind.into(),
            message: message.into(),
        }
    }
}
