use quiz_core::model::Question;
use sqlx::Row;

use crate::repository::{QuestionRecord, SessionResultRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

/// Options are stored as a JSON-encoded string array in a single column.
pub(crate) fn encode_options(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn decode_options(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let options = decode_options(&row.try_get::<String, _>("options").map_err(ser)?)?;
    let record = QuestionRecord {
        position: row.try_get("position").map_err(ser)?,
        text: row.try_get("text").map_err(ser)?,
        options,
        correct_option: row.try_get("correct_option").map_err(ser)?,
        points: row.try_get("points").map_err(ser)?,
    };
    record.into_question()
}

pub(crate) fn map_result_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionResultRecord, StorageError> {
    Ok(SessionResultRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        points: u32_from_i64("points", row.try_get::<i64, _>("points").map_err(ser)?)?,
        max_possible_points: u32_from_i64(
            "max_possible_points",
            row.try_get::<i64, _>("max_possible_points").map_err(ser)?,
        )?,
        answered: u32_from_i64("answered", row.try_get::<i64, _>("answered").map_err(ser)?)?,
        tier_label: row.try_get("tier").map_err(ser)?,
        started_at: row.try_get("started_at").map_err(ser)?,
        finished_at: row.try_get("finished_at").map_err(ser)?,
    })
}
