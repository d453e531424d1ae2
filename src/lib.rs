//! Retrieval-augmented chatbot over a corpus of scientific papers.
//!
//! `cord-ingest` turns a ZIP of paper JSON into a persisted chunk store;
//! `cord-chat` serves a stateless chat page answering from that store.

pub mod chain;
pub mod chat;
pub mod core;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
