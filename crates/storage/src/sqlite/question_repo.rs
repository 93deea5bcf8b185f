use async_trait::async_trait;
use quiz_core::model::Question;

use super::SqliteRepository;
use super::mapping::{encode_options, map_question_row};
use crate::repository::{QuestionRecord, QuestionRepository, StorageError};

#[async_trait]
impl QuestionRepository for SqliteRepository {
    async fn replace_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM questions")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, question) in questions.iter().enumerate() {
            let record = QuestionRecord::from_question(position as i64, question);
            sqlx::query(
                r"
                    INSERT INTO questions (position, text, options, correct_option, points)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(record.position)
            .bind(&record.text)
            .bind(encode_options(&record.options)?)
            .bind(record.correct_option)
            .bind(record.points)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT position, text, options, correct_option, points
                FROM questions
                ORDER BY position
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_question_row).collect()
    }
}
