use std::fmt;

use quiz_core::model::{ProgressSettings, Question, Quiz, QuizId};
use quiz_core::snapshot::SessionSnapshot;
use services::{AppServices, Clock, Randomness};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod study;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an argument"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- import <quiz.json> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- list   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- study  <quiz_id> [--db <url>] [--seed <n>] [--initial <n>] [--wrong <n>]");
    eprintln!("  cargo run -p app -- stats  <quiz_id> [--db <url>] [--initial <n>] [--wrong <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --initial / --wrong come from saved user settings (1 / 1)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Import(String),
    List,
    Study(QuizId),
    Stats(QuizId),
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    seed: Option<u64>,
    initial: Option<u32>,
    wrong: Option<u32>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let Some(first) = args.next() else {
            return Ok(None);
        };
        let command = match first.as_str() {
            "--help" | "-h" => return Ok(None),
            "import" => Command::Import(
                args.next()
                    .ok_or(ArgsError::MissingOperand { command: "import" })?,
            ),
            "list" => Command::List,
            "study" => Command::Study(QuizId::new(
                args.next()
                    .ok_or(ArgsError::MissingOperand { command: "study" })?,
            )),
            "stats" => Command::Stats(QuizId::new(
                args.next()
                    .ok_or(ArgsError::MissingOperand { command: "stats" })?,
            )),
            _ => return Err(ArgsError::UnknownArg(first)),
        };

        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut seed = std::env::var("QUIZ_SEED")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok());
        let mut initial = None;
        let mut wrong = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--seed" => {
                    seed = Some(parse_number(require_value(&mut args, "--seed")?, "--seed")?);
                }
                "--initial" => {
                    initial = Some(parse_number(
                        require_value(&mut args, "--initial")?,
                        "--initial",
                    )?);
                }
                "--wrong" => {
                    wrong = Some(parse_number(require_value(&mut args, "--wrong")?, "--wrong")?);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            command,
            db_url,
            seed,
            initial,
            wrong,
        }))
    }

    fn randomness(&self) -> Randomness {
        self.seed.map_or(Randomness::Entropy, Randomness::Seeded)
    }

    /// Command-line knobs win over saved settings.
    fn progress_settings(&self, saved: ProgressSettings) -> ProgressSettings {
        ProgressSettings::new(
            self.initial.unwrap_or(saved.initial_reoccurrences),
            self.wrong.unwrap_or(saved.wrong_answer_reoccurrences),
        )
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

/// Parse a quiz file, restoring question and answer order by position.
///
/// A question with more than one correct answer is always multi-select.
fn parse_quiz(raw: &str) -> Result<Quiz, serde_json::Error> {
    let parsed: Quiz = serde_json::from_str(raw)?;
    let questions = parsed
        .questions
        .into_iter()
        .map(|mut question: Question| {
            question.answers.sort_by_key(|a| a.position);
            question.multiple |= question.answers.iter().filter(|a| a.is_correct).count() > 1;
            question
        })
        .collect();
    Ok(Quiz::new(parsed.id, parsed.title, questions))
}

fn print_snapshot(quiz: &Quiz, snapshot: &SessionSnapshot) {
    println!(
        "{}: {}/{} mastered ({:.0}%), {} correct, {} wrong",
        quiz.title,
        snapshot.mastered,
        snapshot.total(),
        snapshot.progress_ratio() * 100.0,
        snapshot.correct_total,
        snapshot.wrong_total,
    );
    for question in &quiz.questions {
        let remaining = snapshot
            .remaining_by_question
            .get(&question.id)
            .copied()
            .unwrap_or(0);
        println!("  [{remaining:>3}] {}", question.body);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    tracing::debug!(db = %parsed.db_url, "opening database");
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.randomness()).await?;

    match &parsed.command {
        Command::Import(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            let quiz = services.quizzes().import(parse_quiz(&raw)?).await?;
            println!("imported {} ({} questions) as {}", quiz.title, quiz.len(), quiz.id);
        }
        Command::List => {
            for quiz in services.quizzes().list(128).await? {
                println!("{}\t{}\t{} questions", quiz.id, quiz.title, quiz.len());
            }
        }
        Command::Study(quiz_id) => {
            let saved = services.settings().load().await?;
            let settings = parsed.progress_settings(saved.progress());
            study::run(&services.session_loop(), quiz_id, &settings).await?;
        }
        Command::Stats(quiz_id) => {
            let saved = services.settings().load().await?;
            let settings = parsed.progress_settings(saved.progress());
            match services.session_loop().active_session(quiz_id).await? {
                Some(study) => print_snapshot(study.quiz(), &study.snapshot(&settings)),
                None => {
                    let quiz = services.quizzes().get(quiz_id).await?;
                    println!("no active session for {quiz_id}");
                    let empty = SessionSnapshot::compute(&quiz.questions, &[], &settings);
                    print_snapshot(&quiz, &empty);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items
            .iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_study_flags() {
        let parsed = Args::parse(args(&[
            "study", "geo", "--db", "sqlite::memory:", "--seed", "9", "--wrong", "3",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.command, Command::Study(QuizId::new("geo")));
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.randomness(), Randomness::Seeded(9));
        let settings = parsed.progress_settings(ProgressSettings::new(2, 1));
        assert_eq!(settings, ProgressSettings::new(2, 3));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Args::parse(args(&["study"])),
            Err(ArgsError::MissingOperand { command: "study" })
        ));
        assert!(matches!(
            Args::parse(args(&["stats", "q", "--initial", "x"])),
            Err(ArgsError::InvalidNumber { flag: "--initial", .. })
        ));
        assert!(matches!(
            Args::parse(args(&["list", "--bogus"])),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(Args::parse(args(&[])).unwrap().is_none());
    }

    #[test]
    fn quiz_file_is_reordered_by_position() {
        let raw = r#"{
            "id": "geo",
            "title": "Geography",
            "questions": [
                {"id": "q2", "position": 2, "body": "Second", "multiple": false, "answers": [
                    {"id": "b", "position": 1, "body": "B", "is_correct": false},
                    {"id": "a", "position": 0, "body": "A", "is_correct": true}
                ]},
                {"id": "q1", "position": 1, "body": "First", "multiple": false, "answers": []}
            ]
        }"#;
        let quiz = parse_quiz(raw).unwrap();
        assert_eq!(quiz.questions[0].body, "First");
        assert_eq!(quiz.questions[1].answers[0].body, "A");
    }
}
