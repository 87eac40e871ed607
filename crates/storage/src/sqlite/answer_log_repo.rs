use async_trait::async_trait;
use quiz_core::model::{AnswerEvent, SessionId};

use super::{
    SqliteRepository,
    mapping::{conn, encode_selection, map_event_row, write_error},
};
use crate::repository::{AnswerLogRepository, StorageError};

impl SqliteRepository {
    async fn ensure_session(&self, session_id: &SessionId) -> Result<(), StorageError> {
        sqlx::query("SELECT 1 FROM quiz_sessions WHERE id = ?1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AnswerLogRepository for SqliteRepository {
    async fn load_log(&self, session_id: &SessionId) -> Result<Vec<AnswerEvent>, StorageError> {
        self.ensure_session(session_id).await?;

        let rows = sqlx::query(
            r"
            SELECT id, question_id, answered_at, selected_answer_ids, was_correct
            FROM answer_events
            WHERE session_id = ?1
            ORDER BY seq
            ",
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_event_row).collect()
    }

    async fn append_event(
        &self,
        session_id: &SessionId,
        event: &AnswerEvent,
    ) -> Result<(), StorageError> {
        let selected = encode_selection(event.selected())?;

        sqlx::query(
            r"
            INSERT INTO answer_events (
                id, session_id, question_id, answered_at, selected_answer_ids, was_correct
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(event.id().as_str())
        .bind(session_id.as_str())
        .bind(event.question_id().as_str())
        .bind(event.answered_at())
        .bind(selected)
        .bind(i64::from(event.was_correct()))
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    async fn clear_log(&self, session_id: &SessionId) -> Result<(), StorageError> {
        self.ensure_session(session_id).await?;

        sqlx::query("DELETE FROM answer_events WHERE session_id = ?1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        Ok(())
    }
}
