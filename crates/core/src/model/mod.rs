mod question;
mod session;
mod tier;

pub use question::{Question, QuestionDraft, QuestionError, max_possible_points};
pub use session::{DEFAULT_SECS_PER_QUESTION, QuizSession, QuizStatus, TickOutcome};
pub use tier::{ScoreTier, percentage};
