//! Retrieval-augmented answer chain.
//!
//! A question goes two ways: unchanged into the prompt, and through the
//! retriever (embed, then top-K cosine search). The retrieved chunk texts and
//! the question fill the prompt template, the generation model runs once, and
//! its reply is the answer.

mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

pub use prompt::{PromptTemplate, DEFAULT_RAG_PROMPT};

use crate::chat::ResponseGenerator;
use crate::core::config::ModelSettings;
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::rag::{format_docs, format_retrieved_for_log, RagStore, StoredChunk};

#[derive(Debug, Clone, Serialize)]
pub struct ChainResult {
    pub question: String,
    pub context: Vec<StoredChunk>,
    pub answer: String,
}

pub struct RagChain {
    store: Arc<dyn RagStore>,
    generator: Arc<dyn LlmProvider>,
    embedder: Arc<dyn LlmProvider>,
    prompt: PromptTemplate,
    settings: ModelSettings,
    top_k: usize,
}

impl RagChain {
    pub fn new(
        store: Arc<dyn RagStore>,
        generator: Arc<dyn LlmProvider>,
        embedder: Arc<dyn LlmProvider>,
        settings: ModelSettings,
        top_k: usize,
    ) -> Result<Self, ApiError> {
        let prompt = match &settings.prompt_template {
            Some(template) => PromptTemplate::new(template.clone())?,
            None => PromptTemplate::default(),
        };

        Ok(Self {
            store,
            generator,
            embedder,
            prompt,
            settings,
            top_k: top_k.max(1),
        })
    }

    /// Top-K chunks for the question, best match first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<StoredChunk>, ApiError> {
        let embeddings = self
            .embedder
            .embed(&[question.to_string()], &self.settings.embedding_model.id)
            .await?;
        let query = embeddings.into_iter().next().ok_or_else(|| {
            ApiError::Upstream("embedding model returned no vector for the question".to_string())
        })?;

        let results = self.store.search(&query, self.top_k).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    pub async fn invoke(&self, question: &str) -> Result<ChainResult, ApiError> {
        let context = self.retrieve(question).await?;

        let prompt = self.prompt.format(&format_docs(&context), question);
        let request =
            ChatRequest::new(vec![ChatMessage::user(prompt)]).with_settings(&self.settings);
        let raw = self
            .generator
            .chat(request, &self.settings.text_model.id)
            .await?;

        Ok(ChainResult {
            question: question.to_string(),
            context,
            answer: raw.trim().to_string(),
        })
    }
}

#[async_trait]
impl ResponseGenerator for RagChain {
    async fn generate_response(&self, user_input: &str) -> Result<Vec<String>, ApiError> {
        let result = self.invoke(user_input).await?;
        tracing::info!("{}", format_retrieved_for_log(&result.context));
        Ok(vec![result.answer])
    }
}
