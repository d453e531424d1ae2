//! Abstract interface for the chunk and embedding store.
//!
//! The ingestion CLI writes through it and the query chain reads through it.
//! The implementation shipped with the crate is `SqliteRagStore`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A stored chunk with its source identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Archive entry the chunk was cut from.
    pub source: String,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

#[async_trait]
pub trait RagStore: Send + Sync {
    /// Insert chunks with their embedding vectors in one transaction.
    async fn insert_batch(
        &self,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<(), ApiError>;

    /// Top-`limit` chunks by cosine similarity to the query embedding.
    ///
    /// Results are ordered by descending score; equal scores are ordered by
    /// chunk id so repeated searches return the same list.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    async fn count(&self) -> Result<usize, ApiError>;

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), ApiError>;

    async fn get_meta(&self, key: &str) -> Result<Option<String>, ApiError>;
}
