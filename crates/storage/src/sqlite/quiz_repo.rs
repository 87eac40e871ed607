use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::{Answer, Question, QuestionId, Quiz, QuizId};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{bool_from_i64, conn, map_answer_row, position_from_i64, position_to_i64, ser},
};
use crate::repository::{QuizRepository, StorageError};

#[async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO quizzes (id, title)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            ",
        )
        .bind(quiz.id.as_str())
        .bind(quiz.title.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Questions are replaced wholesale; answers cascade. `ordinal` keeps the
        // in-memory order, including ties on `position`.
        sqlx::query("DELETE FROM questions WHERE quiz_id = ?1")
            .bind(quiz.id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (question_ordinal, question) in (0_i64..).zip(&quiz.questions) {
            sqlx::query(
                r"
                INSERT INTO questions (
                    id, quiz_id, position, ordinal, body, explanation, multiple, image
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )
            .bind(question.id.as_str())
            .bind(quiz.id.as_str())
            .bind(position_to_i64(question.position))
            .bind(question_ordinal)
            .bind(question.body.as_str())
            .bind(question.explanation.as_deref())
            .bind(i64::from(question.multiple))
            .bind(question.image.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for (answer_ordinal, answer) in (0_i64..).zip(&question.answers) {
                sqlx::query(
                    r"
                    INSERT INTO answers (
                        id, quiz_id, question_id, position, ordinal, body, is_correct, image
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ",
                )
                .bind(answer.id.as_str())
                .bind(quiz.id.as_str())
                .bind(question.id.as_str())
                .bind(position_to_i64(answer.position))
                .bind(answer_ordinal)
                .bind(answer.body.as_str())
                .bind(i64::from(answer.is_correct))
                .bind(answer.image.as_deref())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError> {
        let quiz_row = sqlx::query("SELECT id, title FROM quizzes WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;
        let title: String = quiz_row.try_get("title").map_err(ser)?;

        let answer_rows = sqlx::query(
            r"
            SELECT id, question_id, position, body, is_correct, image
            FROM answers
            WHERE quiz_id = ?1
            ORDER BY question_id, ordinal
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut answers: HashMap<QuestionId, Vec<Answer>> = HashMap::new();
        for row in &answer_rows {
            let (question_id, answer) = map_answer_row(row)?;
            answers.entry(question_id).or_default().push(answer);
        }

        let question_rows = sqlx::query(
            r"
            SELECT id, position, body, explanation, multiple, image
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY ordinal
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            let question_id = QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?);
            questions.push(Question {
                answers: answers.remove(&question_id).unwrap_or_default(),
                id: question_id,
                position: position_from_i64("position", row.try_get("position").map_err(ser)?)?,
                body: row.try_get("body").map_err(ser)?,
                explanation: row.try_get("explanation").map_err(ser)?,
                multiple: bool_from_i64("multiple", row.try_get("multiple").map_err(ser)?)?,
                image: row.try_get("image").map_err(ser)?,
            });
        }

        Ok(Quiz {
            id: id.clone(),
            title,
            questions,
        })
    }

    async fn list_quizzes(&self, limit: u32) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query("SELECT id FROM quizzes ORDER BY title, id LIMIT ?1")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut quizzes = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = QuizId::new(row.try_get::<String, _>("id").map_err(ser)?);
            quizzes.push(self.get_quiz(&id).await?);
        }
        Ok(quizzes)
    }
}
