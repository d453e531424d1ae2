use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::errors::ApiError;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// One chat turn. The role is kept as an open string; only `user` and
/// `assistant` can be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_ASSISTANT.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("malformed transcript: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to serialize transcript: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unrecognized turn role '{0}'")]
    UnknownRole(String),
}

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        match err {
            TranscriptError::Decode(_) => ApiError::BadRequest(err.to_string()),
            TranscriptError::Encode(_) | TranscriptError::UnknownRole(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Parses a serialized transcript. A blank string is an empty transcript.
pub fn decode(serialized: &str) -> Result<Vec<Turn>, TranscriptError> {
    if serialized.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(serialized).map_err(TranscriptError::Decode)
}

pub fn encode(turns: &[Turn]) -> Result<String, TranscriptError> {
    serde_json::to_string(turns).map_err(TranscriptError::Encode)
}
