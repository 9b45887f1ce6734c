mod question;
mod round;
mod settings;
mod statistics;

pub use question::{AlertModel, Question, QuizStep};
pub use round::{QUESTIONS_PER_ROUND, RoundError, RoundState};
pub use settings::{QuizSettings, QuizSettingsDraft, QuizSettingsError};
pub use statistics::{GameResult, GameResultError, StatisticsRecord};
