use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameResultError {
    #[error("correct answers ({correct}) exceed question count ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Score of a single finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    correct: u32,
    total: u32,
    achieved_at: DateTime<Utc>,
}

impl GameResult {
    /// # Errors
    ///
    /// Returns `GameResultError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(
        correct: u32,
        total: u32,
        achieved_at: DateTime<Utc>,
    ) -> Result<Self, GameResultError> {
        if correct > total {
            return Err(GameResultError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            achieved_at,
        })
    }

    /// The placeholder best game used before any round was recorded.
    #[must_use]
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            correct: 0,
            total: 0,
            achieved_at: at,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn achieved_at(&self) -> DateTime<Utc> {
        self.achieved_at
    }

    /// Strictly higher score wins; ties keep the older record.
    #[must_use]
    pub fn beats(&self, other: &GameResult) -> bool {
        self.correct > other.correct
    }
}

/// Lifetime statistics across all completed rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub games_played: u64,
    pub cumulative_correct: u64,
    pub best_game: GameResult,
}

impl StatisticsRecord {
    /// The record as it looks before the first round completes.
    #[must_use]
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            games_played: 0,
            cumulative_correct: 0,
            best_game: GameResult::empty(at),
        }
    }

    /// Percentage of correct answers over every question ever asked.
    ///
    /// Returns `0.0` when no rounds were played.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_accuracy(&self, questions_per_round: u32) -> f64 {
        if self.games_played == 0 || questions_per_round == 0 {
            return 0.0;
        }
        let possible = self.games_played as f64 * f64::from(questions_per_round);
        self.cumulative_correct as f64 / possible * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn accuracy_is_zero_without_games() {
        let record = StatisticsRecord::empty(fixed_now());
        assert!(record.total_accuracy(10).abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_over_two_games() {
        let record = StatisticsRecord {
            games_played: 2,
            cumulative_correct: 15,
            best_game: GameResult::new(8, 10, fixed_now()).unwrap(),
        };
        assert!((record.total_accuracy(10) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn result_rejects_impossible_score() {
        let err = GameResult::new(11, 10, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            GameResultError::CorrectExceedsTotal {
                correct: 11,
                total: 10
            }
        );
    }

    #[test]
    fn equal_score_does_not_beat() {
        let old = GameResult::new(7, 10, fixed_now()).unwrap();
        let same = GameResult::new(7, 10, fixed_now()).unwrap();
        let better = GameResult::new(8, 10, fixed_now()).unwrap();

        assert!(!same.beats(&old));
        assert!(better.beats(&old));
    }
}
