use std::fmt;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::QuizSettingsDraft;
use services::{
    MovieQuestionSource, QuestionSource, QuizController, SessionConfig, StaticQuestionSource,
    StatisticsService,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{LineOutcome, TerminalSurface};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSource { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSource { raw } => {
                write!(f, "invalid --source value (expected static or movies): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  movie-quiz play  [--db <sqlite_url>] [--source static|movies]");
    eprintln!("                   [--movies-url <url>] [--api-key <key>]");
    eprintln!("  movie-quiz stats [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --source static");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SOURCE, QUIZ_MOVIES_URL, QUIZ_API_KEY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Static,
    Movies,
}

impl SourceKind {
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        match raw.trim() {
            "static" => Ok(Self::Static),
            "movies" => Ok(Self::Movies),
            _ => Err(ArgsError::InvalidSource {
                raw: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    source: SourceKind,
    settings: QuizSettingsDraft,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .unwrap_or_else(|| "sqlite:quiz.sqlite3".into());
        db_url = normalize_sqlite_url(db_url);
        let mut source = match std::env::var("QUIZ_SOURCE") {
            Ok(raw) => SourceKind::parse(&raw)?,
            Err(_) => SourceKind::Static,
        };
        let mut settings = QuizSettingsDraft {
            movies_url: std::env::var("QUIZ_MOVIES_URL").ok(),
            api_key: std::env::var("QUIZ_API_KEY").ok(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--source" => {
                    source = SourceKind::parse(&require_value(args, "--source")?)?;
                }
                "--movies-url" => {
                    settings.movies_url = Some(require_value(args, "--movies-url")?);
                }
                "--api-key" => {
                    settings.api_key = Some(require_value(args, "--api-key")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            source,
            settings,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn build_source(args: &Args) -> Result<Arc<dyn QuestionSource>, Box<dyn std::error::Error>> {
    match args.source {
        SourceKind::Static => Ok(Arc::new(StaticQuestionSource::movie_ratings())),
        SourceKind::Movies => {
            let settings = args.settings.clone().validate()?;
            Ok(Arc::new(MovieQuestionSource::new(&settings)?))
        }
    }
}

async fn play(
    args: &Args,
    statistics: StatisticsService,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = build_source(args)?;
    let surface = Arc::new(TerminalSurface::new());
    let quiz = QuizController::new(
        SessionConfig::default(),
        source,
        Arc::clone(&surface) as Arc<dyn services::PresentationSurface>,
        statistics,
    )?;
    let handle = quiz.handle();

    let input = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if surface.route_line(&line, &handle) == LineOutcome::Quit {
                        break;
                    }
                }
                Ok(None) => {
                    handle.shutdown();
                    break;
                }
                Err(err) => {
                    tracing::warn!(target: "quiz.terminal", %err, "stdin read failed");
                    handle.shutdown();
                    break;
                }
            }
        }
    });

    quiz.run().await;
    input.abort();
    Ok(())
}

async fn stats(statistics: &StatisticsService) -> Result<(), Box<dyn std::error::Error>> {
    let record = statistics.record().await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    println!("accuracy: {:.2}%", statistics.total_accuracy().await);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite here so core/services stay free of file handling.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let statistics = StatisticsService::new(Clock::system(), storage.statistics);
    tracing::debug!(target: "quiz.app", db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Play => play(&parsed, statistics).await,
        Command::Stats => stats(&statistics).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
