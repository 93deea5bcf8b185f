use std::fs;
use std::path::Path;

use serde::Deserialize;

use quiz_core::model::{Question, QuestionDraft};

use crate::error::QuestionFileError;

/// Question files come either as a bare array or wrapped in a `questions`
/// object, the shape the original JSON data used.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    Wrapped { questions: Vec<QuestionDraft> },
    Bare(Vec<QuestionDraft>),
}

/// Read and validate a question file.
///
/// # Errors
///
/// Returns `QuestionFileError` if the file cannot be read, is not valid
/// JSON, or contains a question that fails domain validation.
pub fn load_question_file(path: impl AsRef<Path>) -> Result<Vec<Question>, QuestionFileError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| QuestionFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_question_json(&raw)
}

/// Parse and validate question JSON.
///
/// # Errors
///
/// Returns `QuestionFileError::Json` for malformed JSON and
/// `QuestionFileError::Question` for entries failing validation.
pub fn parse_question_json(raw: &str) -> Result<Vec<Question>, QuestionFileError> {
    let file: QuestionFile = serde_json::from_str(raw)?;
    let drafts = match file {
        QuestionFile::Wrapped { questions } => questions,
        QuestionFile::Bare(drafts) => drafts,
    };
    drafts
        .into_iter()
        .map(|draft| draft.validate().map_err(QuestionFileError::from))
        .collect()
}
