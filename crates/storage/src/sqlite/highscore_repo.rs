use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{ser, u32_from_i64};
use crate::repository::{HighscoreRepository, StorageError};

#[async_trait]
impl HighscoreRepository for SqliteRepository {
    async fn get_highscore(&self) -> Result<Option<u32>, StorageError> {
        let row = sqlx::query("SELECT points FROM highscore WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let points: i64 = row.try_get("points").map_err(ser)?;
        u32_from_i64("points", points).map(Some)
    }

    async fn record_highscore(
        &self,
        points: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO highscore (id, points, recorded_at)
                VALUES (1, ?1, ?2)
                ON CONFLICT(id) DO UPDATE SET
                    points = excluded.points,
                    recorded_at = excluded.recorded_at
            ",
        )
        .bind(i64::from(points))
        .bind(recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
