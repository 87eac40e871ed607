use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::{
    AnswerEvent, AnswerId, ProgressSettings, Question, QuestionId, QuizId, QuizSession, SessionId,
    SessionStateError,
};
use quiz_core::selector::pick_next;
use quiz_core::snapshot::SessionSnapshot;
use storage::repository::{AnswerLogRepository, QuizRepository, SessionRepository};

use super::study::StudySession;
use crate::Clock;
use crate::error::SessionError;
use crate::randomness::Randomness;

/// Result of answering a single question.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub event: AnswerEvent,
    pub snapshot: SessionSnapshot,
    pub is_complete: bool,
}

/// Orchestrates session start, selection and persisted answering.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    randomness: Randomness,
    quizzes: Arc<dyn QuizRepository>,
    sessions: Arc<dyn SessionRepository>,
    answer_log: Arc<dyn AnswerLogRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        sessions: Arc<dyn SessionRepository>,
        answer_log: Arc<dyn AnswerLogRepository>,
    ) -> Self {
        Self {
            clock,
            randomness: Randomness::Entropy,
            quizzes,
            sessions,
            answer_log,
        }
    }

    #[must_use]
    pub fn with_randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    /// Resume the active session for a quiz, or start a new one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the quiz does not exist or storage fails.
    pub async fn start_session(&self, quiz_id: &QuizId) -> Result<StudySession, SessionError> {
        let quiz = self.quizzes.get_quiz(quiz_id).await?;

        if let Some(existing) = self.sessions.active_session_for_quiz(quiz_id).await? {
            tracing::info!(
                session = %existing.id(),
                quiz = %quiz_id,
                answers = existing.events().len(),
                "resumed session"
            );
            return Ok(StudySession::new(quiz, existing));
        }

        let session = QuizSession::start(SessionId::generate(), quiz_id.clone(), self.clock.now());
        self.sessions.upsert_session(&session).await?;
        tracing::info!(session = %session.id(), quiz = %quiz_id, "started session");
        Ok(StudySession::new(quiz, session))
    }

    /// Look up the active session for a quiz without creating one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the quiz does not exist or storage fails.
    pub async fn active_session(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<StudySession>, SessionError> {
        let quiz = self.quizzes.get_quiz(quiz_id).await?;
        let session = self.sessions.active_session_for_quiz(quiz_id).await?;
        Ok(session.map(|session| StudySession::new(quiz, session)))
    }

    /// Load a session by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the session or its quiz is missing.
    pub async fn open_session(&self, id: &SessionId) -> Result<StudySession, SessionError> {
        let session = self.sessions.get_session(id).await?;
        let quiz = self.quizzes.get_quiz(session.quiz_id()).await?;
        Ok(StudySession::new(quiz, session))
    }

    /// Pick and present the next question; `None` once the quiz is mastered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` for a finished session.
    /// Returns `SessionError::Storage` if the current pointer cannot be persisted.
    pub async fn next_question(
        &self,
        study: &mut StudySession,
        settings: &ProgressSettings,
    ) -> Result<Option<Question>, SessionError> {
        if !study.session.is_active() {
            return Err(SessionStateError::Inactive.into());
        }

        let mut rng = self.randomness.rng_for(study.session.events().len());
        let next = pick_next(
            &study.quiz().questions,
            study.session.events(),
            settings,
            study.session.current_question(),
            &mut rng,
        );

        match &next {
            Some(question) => {
                tracing::debug!(session = %study.session.id(), question = %question.id, "selected question");
            }
            None => {
                tracing::info!(session = %study.session.id(), "all questions mastered");
            }
        }

        study
            .session
            .set_current(next.as_ref().map(|q| q.id.clone()));
        self.sessions.upsert_session(&study.session).await?;
        study.presented_at = next.as_ref().map(|_| self.clock.now());
        study.presented.clone_from(&next);
        Ok(next)
    }

    /// Answer the presented question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoCurrentQuestion` if nothing is presented.
    /// See [`SessionLoopService::submit_answer_for`] for the rest.
    pub async fn submit_answer(
        &self,
        study: &mut StudySession,
        selected: BTreeSet<AnswerId>,
        settings: &ProgressSettings,
    ) -> Result<SubmissionResult, SessionError> {
        let question_id = study
            .current_question()
            .map(|q| q.id.clone())
            .ok_or(SessionError::NoCurrentQuestion)?;
        self.submit_answer_for(study, &question_id, selected, settings)
            .await
    }

    /// Grade `selected` for `question_id`, append the event and recompute progress.
    ///
    /// The event is persisted before it is added to the in-memory log.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if the question is not in the quiz.
    /// Returns `SessionError::State` for a finished session.
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn submit_answer_for(
        &self,
        study: &mut StudySession,
        question_id: &QuestionId,
        selected: BTreeSet<AnswerId>,
        settings: &ProgressSettings,
    ) -> Result<SubmissionResult, SessionError> {
        if !study.session.is_active() {
            return Err(SessionStateError::Inactive.into());
        }
        let question = study
            .quiz()
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.clone()))?;

        let now = self.clock.now();
        let event = AnswerEvent::record(question, selected, now);
        self.answer_log
            .append_event(study.session.id(), &event)
            .await?;
        study.session.record(event.clone())?;

        if let Some(shown_at) = study.presented_at.take() {
            study.session.add_study_time(now - shown_at);
        }
        // The pointer moves to the answered question, so nothing stays presented.
        study.presented = None;
        study.session.set_current(Some(question_id.clone()));
        self.sessions.upsert_session(&study.session).await?;

        let snapshot = study.snapshot(settings);
        tracing::debug!(
            session = %study.session.id(),
            question = %question_id,
            correct = event.was_correct(),
            mastered = snapshot.mastered,
            "recorded answer"
        );
        if snapshot.complete {
            tracing::info!(session = %study.session.id(), "quiz complete");
        }

        Ok(SubmissionResult {
            is_complete: snapshot.complete,
            event,
            snapshot,
        })
    }

    /// Drop the answer log and start over in the same session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn reset_session(&self, study: &mut StudySession) -> Result<(), SessionError> {
        self.answer_log.clear_log(study.session.id()).await?;
        study.session.reset();
        study.presented = None;
        study.presented_at = None;
        self.sessions.upsert_session(&study.session).await?;
        tracing::info!(session = %study.session.id(), "reset session");
        Ok(())
    }

    /// Close the session. Finishing an already finished session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn finish_session(&self, study: &mut StudySession) -> Result<(), SessionError> {
        if !study.session.is_active() {
            return Ok(());
        }

        let now = self.clock.now();
        if let Some(shown_at) = study.presented_at.take() {
            study.session.add_study_time(now - shown_at);
        }
        study.session.finish(now)?;
        study.presented = None;
        self.sessions.upsert_session(&study.session).await?;
        tracing::info!(
            session = %study.session.id(),
            study_secs = study.session.study_time().num_seconds(),
            "finished session"
        );
        Ok(())
    }
}
