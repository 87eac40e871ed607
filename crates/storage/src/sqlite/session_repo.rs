use async_trait::async_trait;
use quiz_core::model::{QuizId, QuizSession, SessionId};

use super::{
    SqliteRepository,
    mapping::{conn, map_session_row, write_error},
};
use crate::repository::{AnswerLogRepository, SessionRecord, SessionRepository, StorageError};

#[async_trait]
impl SessionRepository for SqliteRepository {
    async fn upsert_session(&self, session: &QuizSession) -> Result<(), StorageError> {
        let record = SessionRecord::from_session(session);

        sqlx::query(
            r"
            INSERT INTO quiz_sessions (
                id, quiz_id, started_at, ended_at, is_active, study_time_secs, current_question_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                -- quiz_id and started_at never change after creation
                ended_at = excluded.ended_at,
                is_active = excluded.is_active,
                study_time_secs = excluded.study_time_secs,
                current_question_id = excluded.current_question_id
            ",
        )
        .bind(record.id.as_str())
        .bind(record.quiz_id.as_str())
        .bind(record.started_at)
        .bind(record.ended_at)
        .bind(i64::from(record.is_active))
        .bind(record.study_time_secs)
        .bind(record.current_question.as_ref().map(|q| q.as_str().to_owned()))
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<QuizSession, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, quiz_id, started_at, ended_at, is_active, study_time_secs, current_question_id
            FROM quiz_sessions
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let record = map_session_row(&row)?;
        let events = self.load_log(id).await?;
        record.into_session(events)
    }

    async fn active_session_for_quiz(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizSession>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, quiz_id, started_at, ended_at, is_active, study_time_secs, current_question_id
            FROM quiz_sessions
            WHERE quiz_id = ?1 AND is_active = 1
            ORDER BY started_at DESC
            LIMIT 1
            ",
        )
        .bind(quiz_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = map_session_row(&row)?;
        let events = self.load_log(&record.id).await?;
        record.into_session(events).map(Some)
    }
}
