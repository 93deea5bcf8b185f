use async_trait::async_trait;

use super::SqliteRepository;
use super::mapping::map_result_row;
use crate::repository::{SessionResultRecord, SessionResultRepository, StorageError};

#[async_trait]
impl SessionResultRepository for SqliteRepository {
    async fn append_result(&self, result: &SessionResultRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_results (
                    points, max_possible_points, answered, tier,
                    started_at, finished_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(i64::from(result.points))
        .bind(i64::from(result.max_possible_points))
        .bind(i64::from(result.answered))
        .bind(&result.tier_label)
        .bind(result.started_at)
        .bind(result.finished_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn list_results(&self, limit: u32) -> Result<Vec<SessionResultRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, points, max_possible_points, answered, tier,
                       started_at, finished_at
                FROM session_results
                ORDER BY finished_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_result_row).collect()
    }
}
