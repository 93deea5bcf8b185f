#![forbid(unsafe_code)]

pub mod error;
pub mod quiz;

pub use quiz_core::Clock;

pub use error::{QuestionFileError, QuizEngineError};
pub use quiz::{
    QuestionView, QuizEngine, QuizSnapshot, TimerDriver, TimerHandle, load_question_file,
    parse_question_json,
};
