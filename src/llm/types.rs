use serde::{Deserialize, Serialize};

use crate::core::config::ModelSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub repeat_penalty: Option<f64>,
    pub max_tokens: Option<i32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            repeat_penalty: None,
            max_tokens: None,
        }
    }

    /// Applies the configured generation parameters (greedy decoding,
    /// 512 new tokens, 1.1 repetition penalty by default).
    pub fn with_settings(mut self, settings: &ModelSettings) -> Self {
        self.temperature = Some(settings.temperature);
        self.repeat_penalty = Some(settings.repeat_penalty);
        self.max_tokens = Some(settings.max_tokens);
        self
    }
}
