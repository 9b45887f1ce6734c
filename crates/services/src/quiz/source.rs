use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::Question;

use crate::error::QuestionSourceError;

/// Supplies questions to the quiz controller.
///
/// Both calls may be repeated; the controller ignores deliveries it no longer
/// waits for.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Prepare the backing data set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the data cannot be loaded.
    async fn load_data(&self) -> Result<(), QuestionSourceError>;

    /// Produce the next question, or `None` when nothing is available.
    async fn request_next_question(&self) -> Option<Question>;

    /// Whether a restarted round has to call `load_data` again.
    fn requires_reload(&self) -> bool {
        false
    }
}

const RATING_QUESTION: &str = "Is the rating of this movie greater than 6?";

/// Serves a fixed list of questions in order, wrapping around at the end.
#[derive(Debug, Default)]
pub struct StaticQuestionSource {
    questions: Vec<Question>,
    cursor: AtomicUsize,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            cursor: AtomicUsize::new(0),
        }
    }

    /// The built-in set of ten movie-rating questions.
    #[must_use]
    pub fn movie_ratings() -> Self {
        let movies = [
            ("The Godfather", true),
            ("The Dark Knight", true),
            ("Kill Bill", true),
            ("The Avengers", true),
            ("Deadpool", true),
            ("The Green Knight", true),
            ("Old", false),
            ("The Ice Age Adventures of Buck Wild", false),
            ("Tesla", false),
            ("Vivarium", false),
        ];
        Self::new(
            movies
                .into_iter()
                .map(|(poster, answer)| Question::new(poster.as_bytes(), RATING_QUESTION, answer))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn load_data(&self) -> Result<(), QuestionSourceError> {
        if self.questions.is_empty() {
            return Err(QuestionSourceError::Empty);
        }
        Ok(())
    }

    async fn request_next_question(&self) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        let position = self.cursor.fetch_add(1, Ordering::Relaxed) % self.questions.len();
        self.questions.get(position).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn built_in_set_wraps_around() {
        let source = StaticQuestionSource::movie_ratings();
        source.load_data().await.unwrap();
        assert_eq!(source.len(), 10);

        let first = source.request_next_question().await.unwrap();
        assert_eq!(first.image(), b"The Godfather");
        assert!(first.correct_answer());

        for _ in 1..10 {
            source.request_next_question().await.unwrap();
        }
        assert_eq!(source.request_next_question().await, Some(first));
    }

    #[tokio::test]
    async fn empty_source_fails_to_load_and_yields_nothing() {
        let source = StaticQuestionSource::default();

        assert!(matches!(
            source.load_data().await,
            Err(QuestionSourceError::Empty)
        ));
        assert_eq!(source.request_next_question().await, None);
    }
}
