//! Retrieval side of the chatbot.
//!
//! - `ingest`: reads paper JSON from a ZIP archive and fills the store
//! - `splitter`: separator-based chunking with overlap
//! - `store` / `sqlite`: the chunk + embedding store and its SQLite backend
//! - `context_builder`: formats retrieved chunks for prompts and logs

pub mod context_builder;
pub mod ingest;
pub mod splitter;
pub mod sqlite;
pub mod store;

pub use context_builder::{format_docs, format_retrieved_for_log};
pub use ingest::{create_store, load_documents, IngestError, IngestReport, LoadedArchive};
pub use splitter::{DocumentFragment, TextChunk, TextSplitter};
pub use sqlite::SqliteRagStore;
pub use store::{ChunkSearchResult, RagStore, StoredChunk};
