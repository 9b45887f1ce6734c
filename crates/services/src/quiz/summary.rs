use quiz_core::model::{AlertModel, StatisticsRecord};

pub const ROUND_OVER_TITLE: &str = "This round is over!";
pub const PLAY_AGAIN: &str = "Play again";

/// Builds the end-of-round modal.
#[must_use]
pub fn round_summary(
    correct: u32,
    total: u32,
    record: &StatisticsRecord,
    questions_per_round: u32,
) -> AlertModel {
    let best = &record.best_game;
    let message = format!(
        "Your result: {correct}/{total}\n\
         Quizzes played: {played}\n\
         Record: {best_correct}/{best_total} ({achieved})\n\
         Average accuracy: {accuracy:.2}%",
        played = record.games_played,
        best_correct = best.correct(),
        best_total = best.total(),
        achieved = best.achieved_at().format("%d.%m.%y %H:%M"),
        accuracy = record.total_accuracy(questions_per_round),
    );
    AlertModel::new(ROUND_OVER_TITLE, message, PLAY_AGAIN)
}
