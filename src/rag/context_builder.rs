//! Turns retrieved chunks into prompt context and diagnostic log text.

use super::store::StoredChunk;

const LOG_RULE_WIDTH: usize = 50;

/// Joins chunk texts with a blank line, in retrieval order.
pub fn format_docs(chunks: &[StoredChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbered listing of retrieved chunks separated by a rule of `=`.
pub fn format_retrieved_for_log(chunks: &[StoredChunk]) -> String {
    let rule = format!("\n{}\n", "=".repeat(LOG_RULE_WIDTH));
    let listing = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{}: {}", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join(&rule);
    format!("Documents retrieved:\n{}", listing)
}
