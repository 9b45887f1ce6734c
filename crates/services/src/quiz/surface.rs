use quiz_core::model::{AlertModel, QuizStep};

/// Rendering side of the quiz screen.
///
/// Calls arrive from the controller's run loop and must not block. User
/// actions travel back through a [`QuizHandle`](super::QuizHandle): answers via
/// `answer`, modal dismissal via `restart`, error retry via `retry`.
pub trait PresentationSurface: Send + Sync {
    fn show(&self, step: &QuizStep);

    /// Green border for a correct answer, red otherwise.
    fn flash_border(&self, is_correct: bool);

    /// While disabled the surface must not forward answers.
    fn set_input_enabled(&self, enabled: bool);

    fn show_loading(&self);

    fn hide_loading(&self);

    /// Shows a modal with a single dismiss action that restarts the round.
    fn show_modal(&self, alert: &AlertModel);

    /// Shows a load error with a retry affordance.
    fn show_error(&self, message: &str);
}
