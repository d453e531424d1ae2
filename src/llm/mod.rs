pub mod openai_compat;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use openai_compat::OpenAiCompatibleProvider;
pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};
