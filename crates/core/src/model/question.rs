/// A single yes/no question supplied by a question source.
///
/// `image` is an opaque payload (poster bytes, or a poster name for the
/// built-in set); the core never decodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    image: Vec<u8>,
    text: String,
    correct_answer: bool,
}

impl Question {
    #[must_use]
    pub fn new(image: impl Into<Vec<u8>>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image: image.into(),
            text: text.into(),
            correct_answer,
        }
    }

    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Scores a yes/no answer against this question.
    #[must_use]
    pub fn is_correct(&self, answer: bool) -> bool {
        answer == self.correct_answer
    }
}

/// What the presentation surface renders for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStep {
    pub image: Vec<u8>,
    pub question: String,
    /// 1-indexed progress label, e.g. `"3/10"`.
    pub question_number: String,
}

impl QuizStep {
    /// Pairs a question with its position in the round.
    #[must_use]
    pub fn from_question(question: &Question, index: u32, total: u32) -> Self {
        Self {
            image: question.image().to_vec(),
            question: question.text().to_owned(),
            question_number: format!("{}/{}", index + 1, total),
        }
    }
}

/// Modal content with a single dismiss action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertModel {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl AlertModel {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        button_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            button_text: button_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_label_is_one_indexed() {
        let question = Question::new(b"poster".to_vec(), "Rating above 6?", true);
        let step = QuizStep::from_question(&question, 0, 10);

        assert_eq!(step.question_number, "1/10");
        assert_eq!(step.question, "Rating above 6?");
        assert_eq!(step.image, b"poster");
    }

    #[test]
    fn scoring_compares_with_correct_answer() {
        let question = Question::new(Vec::new(), "Q", false);
        assert!(question.is_correct(false));
        assert!(!question.is_correct(true));
    }
}
