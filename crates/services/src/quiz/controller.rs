use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{QUESTIONS_PER_ROUND, Question, QuizStep, RoundError, RoundState};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::source::QuestionSource;
use super::summary::round_summary;
use super::surface::PresentationSurface;
use crate::statistics_service::StatisticsService;

/// Pause between showing answer feedback and moving on.
pub const FEEDBACK_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub questions_per_round: u32,
    pub feedback_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            questions_per_round: QUESTIONS_PER_ROUND,
            feedback_delay: FEEDBACK_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Constructed, `start` not called yet.
    Idle,
    Loading,
    LoadFailed,
    AwaitingAnswer,
    Feedback,
    RoundComplete,
}

#[derive(Debug)]
enum QuizEvent {
    DataLoaded { ticket: u64 },
    DataLoadFailed { ticket: u64, reason: String },
    QuestionReceived { ticket: u64, question: Option<Question> },
    AnswerGiven(bool),
    FeedbackElapsed { ticket: u64 },
    Restart,
    RetryLoad,
    Shutdown,
}

/// Cloneable entry point for user actions.
///
/// Sends are fire-and-forget; once the controller has shut down they are
/// dropped.
#[derive(Debug, Clone)]
pub struct QuizHandle {
    events: UnboundedSender<QuizEvent>,
}

impl QuizHandle {
    pub fn answer(&self, answer: bool) {
        self.send(QuizEvent::AnswerGiven(answer));
    }

    /// Start a new round; wired to the summary modal's dismiss action.
    pub fn restart(&self) {
        self.send(QuizEvent::Restart);
    }

    /// Retry a failed data load.
    pub fn retry(&self) {
        self.send(QuizEvent::RetryLoad);
    }

    pub fn shutdown(&self) {
        self.send(QuizEvent::Shutdown);
    }

    fn send(&self, event: QuizEvent) {
        if let Err(err) = self.events.send(event) {
            tracing::debug!(target: "quiz.session", event = ?err.0, "controller is gone");
        }
    }
}

/// Drives one quiz screen: loads data, sequences questions, scores answers
/// and records finished rounds.
///
/// All state changes happen inside [`QuizController::process_next`], one event
/// at a time. Source calls and the feedback timer run as spawned tasks that
/// post back into the queue. Each carries the ticket that was current when it
/// was issued; anything arriving with an outdated ticket or in the wrong phase
/// is dropped, so a restart can never be advanced by a leftover timer.
pub struct QuizController {
    config: SessionConfig,
    round: RoundState,
    phase: QuizPhase,
    current: Option<Question>,
    ticket: u64,
    source: Arc<dyn QuestionSource>,
    surface: Arc<dyn PresentationSurface>,
    statistics: StatisticsService,
    events_tx: UnboundedSender<QuizEvent>,
    events_rx: UnboundedReceiver<QuizEvent>,
}

impl QuizController {
    /// # Errors
    ///
    /// Returns `RoundError::Empty` if `config.questions_per_round` is zero.
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn QuestionSource>,
        surface: Arc<dyn PresentationSurface>,
        statistics: StatisticsService,
    ) -> Result<Self, RoundError> {
        let round = RoundState::new(config.questions_per_round)?;
        let (events_tx, events_rx) = unbounded_channel();
        Ok(Self {
            config,
            round,
            phase: QuizPhase::Idle,
            current: None,
            ticket: 0,
            source,
            surface,
            statistics: statistics.with_questions_per_round(config.questions_per_round),
            events_tx,
            events_rx,
        })
    }

    #[must_use]
    pub fn handle(&self) -> QuizHandle {
        QuizHandle {
            events: self.events_tx.clone(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Shows the loading indicator and starts loading the question data.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.begin_load();
    }

    /// Starts the quiz and processes events until [`QuizHandle::shutdown`].
    pub async fn run(mut self) {
        self.start();
        while self.process_next().await {}
    }

    /// Waits for and applies a single event. Returns `false` on shutdown.
    pub async fn process_next(&mut self) -> bool {
        let Some(event) = self.events_rx.recv().await else {
            return false;
        };
        if matches!(event, QuizEvent::Shutdown) {
            tracing::debug!(target: "quiz.session", "shutting down");
            return false;
        }
        self.handle_event(event).await;
        true
    }

    async fn handle_event(&mut self, event: QuizEvent) {
        match event {
            QuizEvent::DataLoaded { ticket } => self.on_data_loaded(ticket),
            QuizEvent::DataLoadFailed { ticket, reason } => self.on_load_failed(ticket, &reason),
            QuizEvent::QuestionReceived { ticket, question } => {
                self.on_question_received(ticket, question);
            }
            QuizEvent::AnswerGiven(answer) => self.on_answer(answer),
            QuizEvent::FeedbackElapsed { ticket } => self.on_feedback_elapsed(ticket).await,
            QuizEvent::Restart => self.on_restart(),
            QuizEvent::RetryLoad => self.on_retry(),
            QuizEvent::Shutdown => {}
        }
    }

    fn is_stale(&self, ticket: u64, expected: QuizPhase) -> bool {
        let stale = ticket != self.ticket || self.phase != expected;
        if stale {
            tracing::debug!(
                target: "quiz.session",
                ticket,
                current = self.ticket,
                phase = ?self.phase,
                "dropping stale delivery"
            );
        }
        stale
    }

    fn begin_load(&mut self) {
        self.ticket += 1;
        self.phase = QuizPhase::Loading;
        self.current = None;
        self.surface.show_loading();

        let ticket = self.ticket;
        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match source.load_data().await {
                Ok(()) => QuizEvent::DataLoaded { ticket },
                Err(err) => QuizEvent::DataLoadFailed {
                    ticket,
                    reason: err.to_string(),
                },
            };
            let _ = events.send(event);
        });
    }

    fn request_question(&mut self) {
        self.ticket += 1;
        self.phase = QuizPhase::AwaitingAnswer;
        self.current = None;

        let ticket = self.ticket;
        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let question = source.request_next_question().await;
            let _ = events.send(QuizEvent::QuestionReceived { ticket, question });
        });
    }

    fn on_data_loaded(&mut self, ticket: u64) {
        if self.is_stale(ticket, QuizPhase::Loading) {
            return;
        }
        tracing::info!(target: "quiz.session", "question data loaded");
        self.surface.hide_loading();
        self.request_question();
    }

    fn on_load_failed(&mut self, ticket: u64, reason: &str) {
        if self.is_stale(ticket, QuizPhase::Loading) {
            return;
        }
        tracing::warn!(target: "quiz.session", reason, "question data failed to load");
        self.phase = QuizPhase::LoadFailed;
        self.surface.hide_loading();
        self.surface.show_error(reason);
    }

    fn on_question_received(&mut self, ticket: u64, question: Option<Question>) {
        if self.is_stale(ticket, QuizPhase::AwaitingAnswer) || self.current.is_some() {
            return;
        }
        let Some(question) = question else {
            tracing::debug!(target: "quiz.session", "source had no question");
            return;
        };

        let step = QuizStep::from_question(&question, self.round.index(), self.round.total());
        self.current = Some(question);
        self.surface.show(&step);
        self.surface.set_input_enabled(true);
    }

    fn on_answer(&mut self, answer: bool) {
        let Some(question) = self.current.take() else {
            tracing::debug!(
                target: "quiz.session",
                answer,
                "no current question; answer ignored"
            );
            return;
        };
        let is_correct = question.is_correct(answer);
        if let Err(err) = self.round.record_answer(is_correct) {
            tracing::warn!(target: "quiz.session", %err, "answer rejected");
            return;
        }

        self.phase = QuizPhase::Feedback;
        self.surface.flash_border(is_correct);
        self.surface.set_input_enabled(false);
        tracing::debug!(
            target: "quiz.session",
            index = self.round.index(),
            is_correct,
            correct = self.round.correct_count(),
            "answer scored"
        );

        let ticket = self.ticket;
        let delay = self.config.feedback_delay;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(QuizEvent::FeedbackElapsed { ticket });
        });
    }

    async fn on_feedback_elapsed(&mut self, ticket: u64) {
        if self.is_stale(ticket, QuizPhase::Feedback) {
            return;
        }
        if self.round.is_last_question() {
            self.finish_round().await;
            return;
        }
        if let Err(err) = self.round.advance() {
            tracing::warn!(target: "quiz.session", %err, "cannot advance round");
            return;
        }
        self.request_question();
    }

    async fn finish_round(&mut self) {
        self.phase = QuizPhase::RoundComplete;
        let correct = self.round.correct_count();
        let total = self.round.total();

        let record = match self.statistics.store(correct, total).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(target: "quiz.session", %err, "failed to record round");
                self.statistics.record().await
            }
        };
        tracing::info!(target: "quiz.session", correct, total, "round complete");

        let alert = round_summary(
            correct,
            total,
            &record,
            self.statistics.questions_per_round(),
        );
        self.surface.show_modal(&alert);
    }

    fn on_restart(&mut self) {
        if matches!(self.phase, QuizPhase::Idle | QuizPhase::Loading | QuizPhase::LoadFailed) {
            tracing::debug!(target: "quiz.session", phase = ?self.phase, "restart ignored");
            return;
        }
        tracing::info!(target: "quiz.session", "restarting round");
        self.round.reset();
        self.surface.set_input_enabled(false);
        if self.source.requires_reload() {
            self.begin_load();
        } else {
            self.request_question();
        }
    }

    fn on_retry(&mut self) {
        if self.phase != QuizPhase::LoadFailed {
            tracing::debug!(target: "quiz.session", phase = ?self.phase, "retry ignored");
            return;
        }
        self.begin_load();
    }
}
