//! Deterministic in-process provider for tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::ApiError;

const DIMENSIONS: usize = 64;

/// Bag-of-words hashing embedder with a canned chat reply.
pub struct HashingProvider {
    pub answer: String,
    pub chat_calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            answer: "stub answer".to_string(),
            chat_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }
}

impl HashingProvider {
    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % DIMENSIONS] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl LlmProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request.messages.last().map(|m| m.content.clone());
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = prompt;
        }
        Ok(self.answer.clone())
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|text| Self::embed_text(text)).collect())
    }
}
