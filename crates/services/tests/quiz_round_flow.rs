use std::sync::Arc;

use quiz_core::model::{AlertModel, QuizStep};
use quiz_core::time::fixed_clock;
use services::{
    PresentationSurface, QuizController, QuizHandle, SessionConfig, StaticQuestionSource,
    StatisticsService,
};
use storage::repository::Storage;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

#[derive(Debug)]
enum Seen {
    Step(QuizStep),
    Modal(AlertModel),
    Error(String),
}

struct ChannelSurface {
    seen: UnboundedSender<Seen>,
}

impl PresentationSurface for ChannelSurface {
    fn show(&self, step: &QuizStep) {
        let _ = self.seen.send(Seen::Step(step.clone()));
    }
    fn flash_border(&self, _is_correct: bool) {}
    fn set_input_enabled(&self, _enabled: bool) {}
    fn show_loading(&self) {}
    fn hide_loading(&self) {}
    fn show_modal(&self, alert: &AlertModel) {
        let _ = self.seen.send(Seen::Modal(alert.clone()));
    }
    fn show_error(&self, message: &str) {
        let _ = self.seen.send(Seen::Error(message.to_owned()));
    }
}

fn spawn_quiz(
    source: StaticQuestionSource,
    statistics: StatisticsService,
) -> (QuizHandle, UnboundedReceiver<Seen>) {
    let (tx, rx) = unbounded_channel();
    let quiz = QuizController::new(
        SessionConfig::default(),
        Arc::new(source),
        Arc::new(ChannelSurface { seen: tx }),
        statistics,
    )
    .expect("controller");
    let handle = quiz.handle();
    tokio::spawn(quiz.run());
    (handle, rx)
}

async fn play_round(
    seen: &mut UnboundedReceiver<Seen>,
    handle: &QuizHandle,
    answer: bool,
) -> AlertModel {
    let mut steps = 0;
    loop {
        match seen.recv().await.expect("surface channel open") {
            Seen::Step(step) => {
                steps += 1;
                assert_eq!(step.question_number, format!("{steps}/10"));
                handle.answer(answer);
            }
            Seen::Modal(alert) => {
                assert_eq!(steps, 10);
                return alert;
            }
            Seen::Error(message) => panic!("unexpected load error: {message}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn two_rounds_accumulate_statistics() {
    let storage = Storage::in_memory();
    let statistics = StatisticsService::new(fixed_clock(), Arc::clone(&storage.statistics));
    let (handle, mut seen) = spawn_quiz(StaticQuestionSource::movie_ratings(), statistics.clone());

    // Six of the built-in movies are rated above 6.
    let first = play_round(&mut seen, &handle, true).await;
    assert_eq!(first.title, "This round is over!");
    assert!(first.message.contains("Your result: 6/10"));
    assert!(first.message.contains("Quizzes played: 1"));
    assert!(first.message.contains("Record: 6/10"));
    assert!(first.message.contains("Average accuracy: 60.00%"));

    handle.restart();
    let second = play_round(&mut seen, &handle, false).await;
    assert!(second.message.contains("Your result: 4/10"));
    assert!(second.message.contains("Quizzes played: 2"));
    assert!(second.message.contains("Record: 6/10"));
    assert!(second.message.contains("Average accuracy: 50.00%"));

    handle.shutdown();
    let record = statistics.record().await;
    assert_eq!(record.games_played, 2);
    assert_eq!(record.cumulative_correct, 10);
    assert_eq!(record.best_game.correct(), 6);
}

#[tokio::test(start_paused = true)]
async fn empty_source_reports_a_single_error() {
    let statistics = StatisticsService::in_memory(fixed_clock());
    let (handle, mut seen) = spawn_quiz(StaticQuestionSource::default(), statistics.clone());

    match seen.recv().await.expect("surface channel open") {
        Seen::Error(message) => assert_eq!(message, "no questions available"),
        other => panic!("expected an error, got {other:?}"),
    }

    handle.shutdown();
    assert!(seen.recv().await.is_none());
    assert_eq!(statistics.games_played().await, 0);
}
