use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    Answer, AnswerEvent, AnswerId, EventId, QuestionId, QuizId, SessionId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{SessionRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Map constraint violations to domain errors, everything else to `Connection`.
pub(crate) fn write_error(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    conn(e)
}

pub(crate) fn position_to_i64(position: u32) -> i64 {
    i64::from(position)
}

pub(crate) fn position_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn bool_from_i64(field: &'static str, v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(StorageError::Serialization(format!("invalid {field}: {v}"))),
    }
}

pub(crate) fn encode_selection(selected: &BTreeSet<AnswerId>) -> Result<String, StorageError> {
    serde_json::to_string(selected).map_err(ser)
}

pub(crate) fn decode_selection(raw: &str) -> Result<BTreeSet<AnswerId>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<(QuestionId, Answer), StorageError> {
    let question_id = QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?);
    let position = position_from_i64("position", row.try_get("position").map_err(ser)?)?;
    let is_correct = bool_from_i64("is_correct", row.try_get("is_correct").map_err(ser)?)?;

    let answer = Answer {
        id: AnswerId::new(row.try_get::<String, _>("id").map_err(ser)?),
        position,
        body: row.try_get("body").map_err(ser)?,
        is_correct,
        image: row.try_get("image").map_err(ser)?,
    };
    Ok((question_id, answer))
}

pub(crate) fn map_event_row(row: &SqliteRow) -> Result<AnswerEvent, StorageError> {
    let answered_at: DateTime<Utc> = row.try_get("answered_at").map_err(ser)?;
    let selected_raw: String = row.try_get("selected_answer_ids").map_err(ser)?;
    let was_correct = bool_from_i64("was_correct", row.try_get("was_correct").map_err(ser)?)?;

    Ok(AnswerEvent::new(
        EventId::new(row.try_get::<String, _>("id").map_err(ser)?),
        QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?),
        answered_at,
        decode_selection(&selected_raw)?,
        was_correct,
    ))
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<SessionRecord, StorageError> {
    let is_active = bool_from_i64("is_active", row.try_get("is_active").map_err(ser)?)?;
    let current_question: Option<String> = row.try_get("current_question_id").map_err(ser)?;

    Ok(SessionRecord {
        id: SessionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        quiz_id: QuizId::new(row.try_get::<String, _>("quiz_id").map_err(ser)?),
        started_at: row.try_get("started_at").map_err(ser)?,
        ended_at: row.try_get("ended_at").map_err(ser)?,
        is_active,
        study_time_secs: row.try_get("study_time_secs").map_err(ser)?,
        current_question: current_question.map(QuestionId::new),
    })
}
