use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS quizzes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS questions (
            id TEXT NOT NULL,
            quiz_id TEXT NOT NULL,
            position INTEGER NOT NULL CHECK (position >= 0),
            ordinal INTEGER NOT NULL CHECK (ordinal >= 0),
            body TEXT NOT NULL,
            explanation TEXT,
            multiple INTEGER NOT NULL CHECK (multiple IN (0, 1)),
            image TEXT,
            PRIMARY KEY (quiz_id, id),
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS answers (
            id TEXT NOT NULL,
            quiz_id TEXT NOT NULL,
            question_id TEXT NOT NULL,
            position INTEGER NOT NULL CHECK (position >= 0),
            ordinal INTEGER NOT NULL CHECK (ordinal >= 0),
            body TEXT NOT NULL,
            is_correct INTEGER NOT NULL CHECK (is_correct IN (0, 1)),
            image TEXT,
            PRIMARY KEY (quiz_id, question_id, id),
            FOREIGN KEY (quiz_id, question_id)
                REFERENCES questions(quiz_id, id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_sessions (
            id TEXT PRIMARY KEY,
            quiz_id TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            is_active INTEGER NOT NULL CHECK (is_active IN (0, 1)),
            study_time_secs INTEGER NOT NULL CHECK (study_time_secs >= 0),
            current_question_id TEXT,
            FOREIGN KEY (quiz_id) REFERENCES quizzes(id) ON DELETE CASCADE
        );
    ",
    // No FK on question_id: events may outlive their question.
    r"
        CREATE TABLE IF NOT EXISTS answer_events (
            seq INTEGER PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            session_id TEXT NOT NULL,
            question_id TEXT NOT NULL,
            answered_at TEXT NOT NULL,
            selected_answer_ids TEXT NOT NULL,
            was_correct INTEGER NOT NULL CHECK (was_correct IN (0, 1)),
            FOREIGN KEY (session_id) REFERENCES quiz_sessions(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            sync_progress INTEGER NOT NULL CHECK (sync_progress IN (0, 1)),
            initial_reoccurrences INTEGER NOT NULL CHECK (initial_reoccurrences >= 0),
            wrong_answer_reoccurrences INTEGER NOT NULL CHECK (wrong_answer_reoccurrences >= 0)
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_answer_events_session_seq
            ON answer_events (session_id, seq);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quiz_sessions_quiz_active
            ON quiz_sessions (quiz_id, is_active, started_at);
    ",
];

/// Runs schema migrations that have not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        tracing::info!("Running migration v0→v1: quizzes, sessions, answer log, settings");
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
