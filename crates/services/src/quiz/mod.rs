mod controller;
mod movies;
mod source;
mod summary;
mod surface;

// Public API of the quiz subsystem.
pub use controller::{FEEDBACK_DELAY, QuizController, QuizHandle, QuizPhase, SessionConfig};
pub use movies::{Movie, MovieQuestionSource, parse_movies, rating_question};
pub use source::{QuestionSource, StaticQuestionSource};
pub use summary::{PLAY_AGAIN, ROUND_OVER_TITLE, round_summary};
pub use surface::PresentationSurface;
