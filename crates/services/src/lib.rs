#![forbid(unsafe_code)]

pub mod error;
pub mod quiz;
pub mod statistics_service;

pub use quiz_core::Clock;

pub use error::{QuestionSourceError, StatisticsError};
pub use quiz::{
    MovieQuestionSource, PresentationSurface, QuestionSource, QuizController, QuizHandle,
    QuizPhase, SessionConfig, StaticQuestionSource,
};
pub use statistics_service::StatisticsService;
