use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{
    AnswerEvent, QuestionId, Quiz, QuizId, QuizSession, SessionId, UserSettings,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a session without its answer log.
///
/// The log lives behind [`AnswerLogRepository`]; a record is joined with it
/// on load.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub quiz_id: QuizId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub study_time_secs: i64,
    pub current_question: Option<QuestionId>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            id: session.id().clone(),
            quiz_id: session.quiz_id().clone(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            is_active: session.is_active(),
            study_time_secs: session.study_time().num_seconds(),
            current_question: session.current_question().cloned(),
        }
    }

    /// Join the record with its log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored state is inconsistent.
    pub fn into_session(self, events: Vec<AnswerEvent>) -> Result<QuizSession, StorageError> {
        QuizSession::from_persisted(
            self.id,
            self.quiz_id,
            self.started_at,
            self.ended_at,
            self.is_active,
            Duration::seconds(self.study_time_secs),
            self.current_question,
            events,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or replace a quiz with all its questions and answers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError>;

    /// List up to `limit` quizzes ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_quizzes(&self, limit: u32) -> Result<Vec<Quiz>, StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist session metadata. The session's in-memory log is not written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn upsert_session(&self, session: &QuizSession) -> Result<(), StorageError>;

    /// Fetch a session together with its full answer log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_session(&self, id: &SessionId) -> Result<QuizSession, StorageError>;

    /// The most recently started active session for a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn active_session_for_quiz(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizSession>, StorageError>;
}

/// Append-only answer log per session.
#[async_trait]
pub trait AnswerLogRepository: Send + Sync {
    /// Load the complete log in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn load_log(&self, session_id: &SessionId) -> Result<Vec<AnswerEvent>, StorageError>;

    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown session and
    /// `StorageError::Conflict` if the event id was already appended.
    async fn append_event(
        &self,
        session_id: &SessionId,
        event: &AnswerEvent,
    ) -> Result<(), StorageError>;

    /// Remove every event of a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session does not exist.
    async fn clear_log(&self, session_id: &SessionId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait UserSettingsRepository: Send + Sync {
    /// Fetch stored settings, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn get_settings(&self) -> Result<Option<UserSettings>, StorageError>;

    /// Persist settings, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    sessions: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
    logs: Arc<Mutex<HashMap<SessionId, Vec<AnswerEvent>>>>,
    settings: Arc<Mutex<Option<UserSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self.quizzes.lock().map_err(poisoned)?;
        guard.insert(quiz.id.clone(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_quizzes(&self, limit: u32) -> Result<Vec<Quiz>, StorageError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        let mut quizzes: Vec<Quiz> = guard.values().cloned().collect();
        quizzes.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        quizzes.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(quizzes)
    }
}

impl InMemoryRepository {
    fn session_with_log(&self, record: SessionRecord) -> Result<QuizSession, StorageError> {
        let events = {
            let logs = self.logs.lock().map_err(poisoned)?;
            logs.get(&record.id).cloned().unwrap_or_default()
        };
        record.into_session(events)
    }

    fn ensure_session(&self, session_id: &SessionId) -> Result<(), StorageError> {
        let sessions = self.sessions.lock().map_err(poisoned)?;
        if sessions.contains_key(session_id) {
            Ok(())
        } else {
            Err(StorageError::NotFound)
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn upsert_session(&self, session: &QuizSession) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.insert(session.id().clone(), SessionRecord::from_session(session));
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<QuizSession, StorageError> {
        let record = {
            let guard = self.sessions.lock().map_err(poisoned)?;
            guard.get(id).cloned().ok_or(StorageError::NotFound)?
        };
        self.session_with_log(record)
    }

    async fn active_session_for_quiz(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<QuizSession>, StorageError> {
        let record = {
            let guard = self.sessions.lock().map_err(poisoned)?;
            guard
                .values()
                .filter(|r| r.is_active && &r.quiz_id == quiz_id)
                .max_by_key(|r| r.started_at)
                .cloned()
        };
        record.map(|r| self.session_with_log(r)).transpose()
    }
}

#[async_trait]
impl AnswerLogRepository for InMemoryRepository {
    async fn load_log(&self, session_id: &SessionId) -> Result<Vec<AnswerEvent>, StorageError> {
        self.ensure_session(session_id)?;
        let guard = self.logs.lock().map_err(poisoned)?;
        Ok(guard.get(session_id).cloned().unwrap_or_default())
    }

    async fn append_event(
        &self,
        session_id: &SessionId,
        event: &AnswerEvent,
    ) -> Result<(), StorageError> {
        self.ensure_session(session_id)?;
        let mut guard = self.logs.lock().map_err(poisoned)?;
        let log = guard.entry(session_id.clone()).or_default();
        if log.iter().any(|e| e.id() == event.id()) {
            return Err(StorageError::Conflict);
        }
        log.push(event.clone());
        Ok(())
    }

    async fn clear_log(&self, session_id: &SessionId) -> Result<(), StorageError> {
        self.ensure_session(session_id)?;
        let mut guard = self.logs.lock().map_err(poisoned)?;
        guard.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl UserSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<UserSettings>, StorageError> {
        let guard = self.settings.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        let mut guard = self.settings.lock().map_err(poisoned)?;
        *guard = Some(*settings);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub answer_log: Arc<dyn AnswerLogRepository>,
    pub settings: Arc<dyn UserSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            quizzes: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            answer_log: Arc::new(repo.clone()),
            settings: Arc::new(repo),
        }
    }
}
