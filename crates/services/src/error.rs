//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::QuestionError;
use storage::repository::StorageError;

/// Errors emitted by `QuizEngine`.
///
/// Invalid commands are not errors: the session ignores them. These cover
/// infrastructure failures only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizEngineError {
    #[error("quiz session lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the question-file loader.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionFileError {
    #[error("failed to read question file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
}
