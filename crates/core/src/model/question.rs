use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("a question needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("correct option {index} is out of range for {len} options")]
    CorrectOptionOutOfRange { index: usize, len: usize },

    #[error("question points must be positive")]
    ZeroPoints,
}

/// A single multiple-choice question. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_option: usize,
    points: u32,
}

impl Question {
    /// Validates and builds a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, fewer than two options are
    /// given, the correct-option index is out of range, or points are zero.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
        points: u32,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { len: options.len() });
        }
        if correct_option >= options.len() {
            return Err(QuestionError::CorrectOptionOutOfRange {
                index: correct_option,
                len: options.len(),
            });
        }
        if points == 0 {
            return Err(QuestionError::ZeroPoints);
        }

        Ok(Self {
            text,
            options,
            correct_option,
            points,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Whether the given option index is the correct answer.
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

/// Unvalidated question shape as it appears in question files.
///
/// Field names mirror the original JSON data (`question`, `options`,
/// `correctOption`, `points`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub points: u32,
}

impl QuestionDraft {
    /// Validates the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for the same conditions as `Question::new`.
    pub fn validate(self) -> Result<Question, QuestionError> {
        Question::new(self.question, self.options, self.correct_option, self.points)
    }
}

/// Sum of all question point values. Saturates instead of overflowing.
#[must_use]
pub fn max_possible_points(questions: &[Question]) -> u32 {
    questions
        .iter()
        .fold(0_u32, |acc, q| acc.saturating_add(q.points()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn builds_valid_question() {
        let q = Question::new("Which year?", options(4), 2, 10).unwrap();
        assert_eq!(q.options().len(), 4);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn rejects_blank_text() {
        let err = Question::new("   ", options(2), 0, 10).unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn rejects_single_option() {
        let err = Question::new("Q", options(1), 0, 10).unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { len: 1 });
    }

    #[test]
    fn rejects_out_of_range_correct_option() {
        let err = Question::new("Q", options(3), 3, 10).unwrap_err();
        assert_eq!(err, QuestionError::CorrectOptionOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn rejects_zero_points() {
        let err = Question::new("Q", options(2), 0, 0).unwrap_err();
        assert_eq!(err, QuestionError::ZeroPoints);
    }

    #[test]
    fn draft_uses_original_field_names() {
        let json = r#"{
            "question": "Which language?",
            "options": ["Rust", "Go", "C"],
            "correctOption": 0,
            "points": 20
        }"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        let q = draft.validate().unwrap();
        assert_eq!(q.text(), "Which language?");
        assert_eq!(q.correct_option(), 0);
        assert_eq!(q.points(), 20);
    }

    #[test]
    fn max_points_saturates() {
        let qs = vec![
            Question::new("A", options(2), 0, u32::MAX).unwrap(),
            Question::new("B", options(2), 0, 10).unwrap(),
        ];
        assert_eq!(max_possible_points(&qs), u32::MAX);
    }
}
