//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AnswerId, QuestionId, SessionStateError, SettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("no question is currently presented")]
    NoCurrentQuestion,
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz title must not be empty")]
    EmptyTitle,
    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),
    #[error("duplicate answer id {answer} in question {question}")]
    DuplicateAnswer {
        question: QuestionId,
        answer: AnswerId,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UserSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
