use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::{DEFAULT_SECS_PER_QUESTION, QuizStatus};
use services::{Clock, QuizEngine, QuizSnapshot, TimerDriver, TimerHandle, load_question_file};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSecs { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSecs { raw } => write!(f, "invalid --secs value: {raw}"),
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
    eprintln!("  cargo run -p app -- play [--db <sqlite_url>] [--secs <per_question>]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] --file <questions.json>");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --secs {DEFAULT_SECS_PER_QUESTION}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS_FILE");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    secs_per_question: u32,
    questions_file: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut secs_per_question = DEFAULT_SECS_PER_QUESTION;
        let mut questions_file = std::env::var("QUIZ_QUESTIONS_FILE").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--secs" => {
                    let value = require_value(args, "--secs")?;
                    secs_per_question = value
                        .parse::<u32>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or(ArgsError::InvalidSecs { raw: value })?;
                }
                "--file" => {
                    questions_file = Some(require_value(args, "--file")?);
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
            secs_per_question,
            questions_file,
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

fn render(snapshot: &QuizSnapshot) {
    match snapshot.status {
        QuizStatus::Loading => println!("loading questions..."),
        QuizStatus::Error => println!("could not load questions (seed the database first?)"),
        QuizStatus::Ready => {
            println!(
                "{} questions, {} points up for grabs. Highscore: {}.",
                snapshot.num_questions, snapshot.max_possible_points, snapshot.highscore
            );
            println!("press enter to start");
        }
        QuizStatus::Active => {
            let Some(question) = &snapshot.question else {
                return;
            };
            println!(
                "[{} / {}]  {} / {} pts  ({}s left)",
                snapshot.progress_value,
                snapshot.num_questions,
                snapshot.points,
                snapshot.max_possible_points,
                snapshot.seconds_remaining
            );
            println!("{}", question.text);
            for (i, option) in question.options.iter().enumerate() {
                let marker = if snapshot.selected_option == Some(i) {
                    ">"
                } else {
                    " "
                };
                println!("  {marker} {i}) {option}");
            }
            if snapshot.selected_option.is_some() {
                println!("type n for the next question");
            }
        }
        QuizStatus::Finished => {
            let tier = snapshot.finish_tier();
            println!(
                "{} You scored {} out of {} ({:.0}%)",
                tier.emoji(),
                snapshot.points,
                snapshot.max_possible_points,
                snapshot.percent().ceil()
            );
            println!("(Highscore: {} points)", snapshot.highscore);
            println!("type r to restart, q to quit");
        }
    }
}

async fn play(engine: Arc<QuizEngine>) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = engine.load().await?;
    render(&snapshot);
    if snapshot.status == QuizStatus::Error {
        return Ok(());
    }

    let mut timer: Option<TimerHandle> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim().to_ascii_lowercase();
        let snapshot = match input.as_str() {
            "q" | "quit" => break,
            "" | "start" => {
                let snapshot = engine.start()?;
                if snapshot.status == QuizStatus::Active && timer.is_none() {
                    timer = Some(TimerDriver::spawn(
                        Arc::clone(&engine),
                        Duration::from_secs(1),
                    )?);
                }
                snapshot
            }
            "n" | "next" => engine.next_question()?,
            "r" | "restart" => {
                if let Some(handle) = timer.take() {
                    handle.stop();
                }
                engine.restart().await?
            }
            other => match other.parse::<usize>() {
                Ok(option) => engine.select_option(option)?,
                Err(_) => {
                    println!("enter an option number, n, r, or q");
                    continue;
                }
            },
        };

        if snapshot.status != QuizStatus::Active {
            if let Some(handle) = timer.take() {
                handle.stop();
            }
        }
        render(&snapshot);
    }

    Ok(())
}

async fn seed(storage: &Storage, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let questions = load_question_file(file)?;
    storage.questions.replace_questions(&questions).await?;
    println!("Seeded {} questions from {file}", questions.len());
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

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    match cmd {
        Command::Play => {
            let engine = Arc::new(
                QuizEngine::new(
                    Clock::default(),
                    Arc::clone(&storage.questions),
                    Arc::clone(&storage.highscores),
                    Arc::clone(&storage.results),
                )
                .with_secs_per_question(args.secs_per_question),
            );
            play(engine).await
        }
        Command::Seed => {
            let Some(file) = args.questions_file.as_deref() else {
                eprintln!("seed requires --file <questions.json> (or QUIZ_QUESTIONS_FILE)");
                print_usage();
                return Err(ArgsError::MissingValue { flag: "--file" }.into());
            };
            seed(&storage, file).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
