mod engine;
mod loader;
mod timer;
mod view;

// Public API of the quiz subsystem.
pub use crate::error::{QuestionFileError, QuizEngineError};
pub use engine::QuizEngine;
pub use loader::{load_question_file, parse_question_json};
pub use timer::{TimerDriver, TimerHandle};
pub use view::{QuestionView, QuizSnapshot};
