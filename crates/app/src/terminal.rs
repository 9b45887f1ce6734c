use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use quiz_core::model::{AlertModel, QuizStep};
use services::{PresentationSurface, QuizHandle};

/// What the next line typed by the player means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Busy,
    Answer,
    Dismiss,
    Retry,
}

/// Result of routing one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Quit,
}

/// Line-oriented surface on stdout. Answers are typed as `y`/`n`.
pub struct TerminalSurface {
    prompt: Mutex<Prompt>,
    input_enabled: AtomicBool,
}

impl TerminalSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prompt: Mutex::new(Prompt::Busy),
            input_enabled: AtomicBool::new(false),
        }
    }

    fn set_prompt(&self, prompt: Prompt) {
        let mut guard = match self.prompt.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = prompt;
    }

    fn prompt(&self) -> Prompt {
        match self.prompt.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Turn a line of player input into a controller action.
    pub fn route_line(&self, line: &str, handle: &QuizHandle) -> LineOutcome {
        let line = line.trim().to_ascii_lowercase();
        if matches!(line.as_str(), "q" | "quit") {
            handle.shutdown();
            return LineOutcome::Quit;
        }

        match self.prompt() {
            Prompt::Dismiss => {
                self.set_prompt(Prompt::Busy);
                handle.restart();
            }
            Prompt::Retry => {
                self.set_prompt(Prompt::Busy);
                handle.retry();
            }
            Prompt::Answer if self.input_enabled.load(Ordering::Acquire) => {
                match parse_answer(&line) {
                    Some(answer) => handle.answer(answer),
                    None => emit(format_args!("Please answer y or n.")),
                }
            }
            Prompt::Answer | Prompt::Busy => {
                tracing::debug!(target: "quiz.terminal", %line, "input ignored while disabled");
            }
        }
        LineOutcome::Continue
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn describe_image(image: &[u8]) -> String {
    match std::str::from_utf8(image) {
        Ok(name) if !name.is_empty() => format!("poster: {name}"),
        _ if image.is_empty() => "no poster".to_string(),
        _ => format!("poster: {} bytes", image.len()),
    }
}

fn emit(args: std::fmt::Arguments<'_>) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{args}");
    let _ = out.flush();
}

impl PresentationSurface for TerminalSurface {
    fn show(&self, step: &QuizStep) {
        emit(format_args!(
            "\n[{}] ({})\n{}  (y/n)",
            step.question_number,
            describe_image(&step.image),
            step.question
        ));
        self.set_prompt(Prompt::Answer);
    }

    fn flash_border(&self, is_correct: bool) {
        if is_correct {
            emit(format_args!("Correct!"));
        } else {
            emit(format_args!("Wrong."));
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.input_enabled.store(enabled, Ordering::Release);
    }

    fn show_loading(&self) {
        emit(format_args!("Loading questions..."));
    }

    fn hide_loading(&self) {}

    fn show_modal(&self, alert: &AlertModel) {
        emit(format_args!(
            "\n== {} ==\n{}\n[Enter] {}   [q] Quit",
            alert.title, alert.message, alert.button_text
        ));
        self.set_prompt(Prompt::Dismiss);
    }

    fn show_error(&self, message: &str) {
        emit(format_args!(
            "\n== Something went wrong ==\n{message}\n[Enter] Try again   [q] Quit"
        ));
        self.set_prompt(Prompt::Retry);
    }
}
