//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{GameResultError, QuizSettingsError};
use storage::repository::StorageError;

/// Errors emitted by `StatisticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error(transparent)]
    GameResult(#[from] GameResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by question sources while loading their data set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("movies endpoint is not configured")]
    NotConfigured,
    #[error("no questions available")]
    Empty,
    #[error("movies API reported: {0}")]
    Api(String),
    #[error("movies request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}
