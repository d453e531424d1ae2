use crate::core::errors::ApiError;

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

/// The standard retrieval QA prompt.
pub const DEFAULT_RAG_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question} \n\
Context: {context} \n\
Answer:";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_RAG_PROMPT.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, ApiError> {
        let template = template.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !template.contains(slot) {
                return Err(ApiError::BadRequest(format!(
                    "prompt template is missing the {} placeholder",
                    slot
                )));
            }
        }
        Ok(Self { template })
    }

    /// Fills both placeholders in a single pass, so placeholder-like text
    /// inside the context or question is left alone.
    pub fn format(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        loop {
            let next = [(CONTEXT_SLOT, context), (QUESTION_SLOT, question)]
                .into_iter()
                .filter_map(|(slot, value)| rest.find(slot).map(|pos| (pos, slot, value)))
                .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, slot, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + slot.len()..];
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        out
    }
}
