use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{Question, QuestionError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a question, keyed by its position in the quiz.
///
/// Mirrors the domain `Question` so repositories can serialize without
/// leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub position: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: i64,
    pub points: i64,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(position: i64, question: &Question) -> Self {
        Self {
            position,
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            correct_option: question.correct_option() as i64,
            points: i64::from(question.points()),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the persisted values no
    /// longer pass domain validation.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let correct_option = usize::try_from(self.correct_option)
            .map_err(|_| StorageError::Serialization("correct_option sign overflow".into()))?;
        let points = u32::try_from(self.points)
            .map_err(|_| StorageError::Serialization(format!("invalid points: {}", self.points)))?;
        Question::new(self.text, self.options, correct_option, points)
            .map_err(|err: QuestionError| StorageError::Serialization(err.to_string()))
    }
}

/// Row shape for one finished quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResultRecord {
    pub id: Option<i64>,
    pub points: u32,
    pub max_possible_points: u32,
    pub answered: u32,
    pub tier_label: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Repository contract for the quiz's question set.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Replace the stored question set, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the questions cannot be stored.
    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StorageError>;

    /// Fetch all questions in quiz order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures. An empty
    /// store yields an empty list, not `NotFound`.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;
}

/// Repository contract for the single persisted highscore.
#[async_trait]
pub trait HighscoreRepository: Send + Sync {
    /// Best points total recorded so far, if any run ever finished.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn get_highscore(&self) -> Result<Option<u32>, StorageError>;

    /// Record a new best score. Callers only invoke this on an increase.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the score cannot be stored.
    async fn record_highscore(
        &self,
        points: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Repository contract for finished-run history.
#[async_trait]
pub trait SessionResultRepository: Send + Sync {
    /// Append one finished run and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &SessionResultRecord) -> Result<i64, StorageError>;

    /// Most recent results first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn list_results(&self, limit: u32) -> Result<Vec<SessionResultRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    highscore: Arc<Mutex<Option<(u32, DateTime<Utc>)>>>,
    results: Arc<Mutex<Vec<SessionResultRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = questions.to_vec();
        Ok(())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl HighscoreRepository for InMemoryRepository {
    async fn get_highscore(&self) -> Result<Option<u32>, StorageError> {
        let guard = self
            .highscore
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.map(|(points, _)| points))
    }

    async fn record_highscore(
        &self,
        points: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .highscore
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some((points, recorded_at));
        Ok(())
    }
}

#[async_trait]
impl SessionResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &SessionResultRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = guard.len() as i64 + 1;
        let mut stored = result.clone();
        stored.id = Some(id);
        guard.push(stored);
        Ok(id)
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<SessionResultRecord>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Aggregates the quiz repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub highscores: Arc<dyn HighscoreRepository>,
    pub results: Arc<dyn SessionResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let highscores: Arc<dyn HighscoreRepository> = Arc::new(repo.clone());
        let results: Arc<dyn SessionResultRepository> = Arc::new(repo);
        Self {
            questions,
            highscores,
            results,
        }
    }
}
