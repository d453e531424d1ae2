//! Separator-based text splitter.
//!
//! Text is cut on a separator (a blank line by default) and the pieces are
//! merged back greedily into chunks of at most `chunk_size` characters.
//! Consecutive chunks share trailing pieces worth up to `chunk_overlap`
//! characters. A piece that alone exceeds `chunk_size` is kept whole.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// One abstract or body paragraph of a paper, before chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFragment {
    pub text: String,
    /// Archive entry the fragment was read from.
    pub source: String,
}

/// A text chunk with source information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Source identifier (archive entry name)
    pub source: String,
    /// Position of the originating fragment in the ingestion order
    pub fragment_index: usize,
    /// Chunk index within the fragment
    pub chunk_index: usize,
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ApiError> {
        Self::with_separator(chunk_size, chunk_overlap, "\n\n")
    }

    pub fn with_separator(
        chunk_size: usize,
        chunk_overlap: usize,
        separator: &str,
    ) -> Result<Self, ApiError> {
        if chunk_size == 0 {
            return Err(ApiError::BadRequest("chunk_size must be positive".to_string()));
        }
        if chunk_overlap > chunk_size {
            return Err(ApiError::BadRequest(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separator: separator.to_string(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits every fragment in order, keeping its source and position.
    pub fn split_fragments(&self, fragments: &[DocumentFragment]) -> Vec<TextChunk> {
        fragments
            .iter()
            .enumerate()
            .flat_map(|(fragment_index, fragment)| {
                self.split_text(&fragment.text)
                    .into_iter()
                    .enumerate()
                    .map(move |(chunk_index, text)| TextChunk {
                        text,
                        source: fragment.source.clone(),
                        fragment_index,
                        chunk_index,
                    })
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            vec![text]
        } else {
            text.split(self.separator.as_str())
                .filter(|piece| !piece.is_empty())
                .collect()
        };
        self.merge_pieces(&pieces)
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = piece.chars().count();
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                self.warn_if_oversized(total);

                if !window.is_empty() {
                    if let Some(chunk) = self.join(&window) {
                        chunks.push(chunk);
                    }

                    // Drop leading pieces until only the overlap tail remains
                    // and the incoming piece fits next to it.
                    while total > self.chunk_overlap
                        || (total > 0
                            && total + len + if window.is_empty() { 0 } else { sep_len }
                                > self.chunk_size)
                    {
                        let Some(front) = window.pop_front() else {
                            break;
                        };
                        let joined = if window.is_empty() { 0 } else { sep_len };
                        total = total.saturating_sub(front.chars().count() + joined);
                    }
                }
            }

            window.push_back(piece);
            total += len + if window.len() > 1 { sep_len } else { 0 };
        }

        self.warn_if_oversized(total);
        if let Some(chunk) = self.join(&window) {
            chunks.push(chunk);
        }

        chunks
    }

    /// Logs a window that a single piece pushed past `chunk_size`. Returns
    /// whether it did.
    fn warn_if_oversized(&self, total: usize) -> bool {
        if total <= self.chunk_size {
            return false;
        }
        tracing::warn!(
            "Created a chunk of size {}, which is longer than the specified {}",
            total,
            self.chunk_size
        );
        true
    }

    fn join(&self, window: &VecDeque<&str>) -> Option<String> {
        let joined = window
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
