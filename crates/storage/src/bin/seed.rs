use std::fmt;

use quiz_core::model::Question;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn opts(raw: [&str; 4]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_string()).collect()
}

fn sample_questions() -> Result<Vec<Question>, quiz_core::model::QuestionError> {
    let samples = [
        (
            "Which keyword introduces an immutable binding?",
            opts(["var", "let", "mut", "const fn"]),
            1,
            10,
        ),
        (
            "What does the ? operator do in a function returning Result?",
            opts([
                "Panics on Err",
                "Silently ignores Err",
                "Returns the Err to the caller",
                "Retries the expression",
            ]),
            2,
            10,
        ),
        (
            "Which type owns a heap-allocated, growable string?",
            opts(["&str", "String", "char", "str"]),
            1,
            10,
        ),
        (
            "How many mutable references to a value may exist at once?",
            opts(["One", "Two", "Any number", "Zero"]),
            0,
            20,
        ),
        (
            "Which trait enables the for loop?",
            opts(["Display", "Clone", "Iterator", "Drop"]),
            2,
            20,
        ),
        (
            "What is the return type of a function with no return value?",
            opts(["null", "()", "None", "void"]),
            1,
            20,
        ),
        (
            "Which smart pointer provides shared ownership in a single thread?",
            opts(["Box<T>", "Rc<T>", "Arc<T>", "RefCell<T>"]),
            1,
            30,
        ),
        (
            "When does a value's Drop implementation run?",
            opts([
                "At the end of the program",
                "When the garbage collector fires",
                "When the value goes out of scope",
                "Never, unless called manually",
            ]),
            2,
            30,
        ),
    ];

    samples
        .into_iter()
        .map(|(text, options, correct, points)| Question::new(text, options, correct, points))
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        eprintln!("Usage: cargo run -p storage --bin seed -- [--db <sqlite_url>]");
        e
    })?;

    let questions = sample_questions()?;
    let storage = Storage::sqlite(&args.db_url).await?;
    storage.questions.replace_questions(&questions).await?;

    println!(
        "Seeded {} questions into {}",
        questions.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
