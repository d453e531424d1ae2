//! Stateless chat loop.
//!
//! Every request carries the whole transcript; the server keeps nothing
//! between requests.

pub mod render;
pub mod transcript;

use async_trait::async_trait;

pub use render::{render_page, render_transcript, LOGO_PATH, LOGO_SVG, PAGE_TITLE};
pub use transcript::{decode, encode, TranscriptError, Turn, ROLE_ASSISTANT, ROLE_USER};

use crate::core::errors::ApiError;

/// Produces the assistant answers for one user message.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate_response(&self, user_input: &str) -> Result<Vec<String>, ApiError>;
}

/// Advances the transcript by one exchange.
///
/// Missing or empty input returns the history untouched and never reaches the
/// generator. Otherwise one user turn is appended, followed by one assistant
/// turn per generated answer.
pub async fn run_chatbot<G>(
    generator: &G,
    chat_history: &str,
    user_input: Option<&str>,
) -> Result<String, ApiError>
where
    G: ResponseGenerator + ?Sized,
{
    let input = match user_input {
        Some(input) if !input.is_empty() => input,
        _ => return Ok(chat_history.to_string()),
    };

    let mut turns = decode(chat_history)?;
    let answers = generator.generate_response(input).await?;

    turns.push(Turn::user(input));
    turns.extend(answers.into_iter().map(Turn::assistant));

    tracing::debug!(turns = turns.len(), "Transcript advanced");
    Ok(encode(&turns)?)
}


#[cfg(test)]
mod tests {
    use super::testing::CountingGenerator;
    use super::*;

    struct FailingGenerator;

    #[async_trait]
    impl ResponseGenerator for FailingGenerator {
        async fn generate_response(&self, _user_input: &str) -> Result<Vec<String>, ApiError> {
            Err(ApiError::Upstream("model offline".to_string()))
        }
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let generator = CountingGenerator::new(&["unused"]);
        let history = encode(&[Turn::user("hi"), Turn::assistant("hello")]).unwrap();

        let same = run_chatbot(&generator, &history, Some("")).await.unwrap();
        assert_eq!(same, history);
        let same = run_chatbot(&generator, &history, None).await.unwrap();
        assert_eq!(same, history);

        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn one_exchange_appends_user_then_assistant() {
        let generator = CountingGenerator::new(&["Around five days."]);

        let history = run_chatbot(&generator, "[]", Some("Incubation period?"))
            .await
            .unwrap();
        let turns = decode(&history).unwrap();

        assert_eq!(
            turns,
            vec![
                Turn::user("Incubation period?"),
                Turn::assistant("Around five days.")
            ]
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn each_answer_becomes_its_own_turn() {
        let generator = CountingGenerator::new(&["first", "second"]);
        let prior = encode(&[Turn::user("q0"), Turn::assistant("a0")]).unwrap();

        let history = run_chatbot(&generator, &prior, Some("q1")).await.unwrap();
        let turns = decode(&history).unwrap();

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[2], Turn::user("q1"));
        assert_eq!(turns[3], Turn::assistant("first"));
        assert_eq!(turns[4], Turn::assistant("second"));
    }

    #[tokio::test]
    async fn generator_failure_leaves_no_partial_turns() {
        let err = run_chatbot(&FailingGenerator, "[]", Some("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let generator: Box<dyn ResponseGenerator> = Box::new(CountingGenerator::new(&["ok"]));
        let history = run_chatbot(generator.as_ref(), "", Some("q")).await.unwrap();
        assert_eq!(decode(&history).unwrap().len(), 2);
    }
}
