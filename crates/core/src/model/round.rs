use thiserror::Error;

/// Number of questions in one round.
pub const QUESTIONS_PER_ROUND: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error("a round needs at least one question")]
    Empty,

    #[error("question {index} was already answered")]
    AlreadyAnswered { index: u32 },

    #[error("question {index} has not been answered yet")]
    Unanswered { index: u32 },

    #[error("question {index} is the last of {total}")]
    PastLastQuestion { index: u32, total: u32 },
}

/// Progress through a single round.
///
/// Holds `0 <= correct_count <= index + 1 <= total` at all times; the
/// mutators refuse any step that would break it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    index: u32,
    correct_count: u32,
    total: u32,
    answered: bool,
}

impl RoundState {
    /// # Errors
    ///
    /// Returns `RoundError::Empty` if `total` is zero.
    pub fn new(total: u32) -> Result<Self, RoundError> {
        if total == 0 {
            return Err(RoundError::Empty);
        }
        Ok(Self {
            index: 0,
            correct_count: 0,
            total,
            answered: false,
        })
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.index + 1 == self.total
    }

    /// Scores the question at the current index.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::AlreadyAnswered` if this question was scored before.
    pub fn record_answer(&mut self, is_correct: bool) -> Result<(), RoundError> {
        if self.answered {
            return Err(RoundError::AlreadyAnswered { index: self.index });
        }
        self.answered = true;
        if is_correct {
            self.correct_count += 1;
        }
        Ok(())
    }

    /// Moves to the next question.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Unanswered` if the current question was not scored,
    /// or `RoundError::PastLastQuestion` when already on the last question.
    pub fn advance(&mut self) -> Result<(), RoundError> {
        if !self.answered {
            return Err(RoundError::Unanswered { index: self.index });
        }
        if self.is_last_question() {
            return Err(RoundError::PastLastQuestion {
                index: self.index,
                total: self.total,
            });
        }
        self.index += 1;
        self.answered = false;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.correct_count = 0;
        self.answered = false;
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            index: 0,
            correct_count: 0,
            total: QUESTIONS_PER_ROUND,
            answered: false,
        }
    }
}
