use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::{AnswerEvent, QuestionId, QuizId, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("ended_at is before started_at")]
    InvalidTimeRange,

    #[error("session is no longer active")]
    Inactive,

    #[error("study time must not be negative")]
    NegativeStudyTime,
}

/// A bounded stretch of quiz-taking with its own append-only answer log.
///
/// The log only grows through [`QuizSession::record`] and is only ever
/// emptied as a whole by [`QuizSession::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    id: SessionId,
    quiz_id: QuizId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    is_active: bool,
    study_time: Duration,
    current_question: Option<QuestionId>,
    events: Vec<AnswerEvent>,
}

impl QuizSession {
    /// Open a fresh, active session with an empty log.
    #[must_use]
    pub fn start(id: SessionId, quiz_id: QuizId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            quiz_id,
            started_at,
            ended_at: None,
            is_active: true,
            study_time: Duration::zero(),
            current_question: None,
            events: Vec::new(),
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTimeRange` if `ended_at` precedes `started_at`,
    /// or `SessionStateError::NegativeStudyTime` for a negative study time.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        quiz_id: QuizId,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        is_active: bool,
        study_time: Duration,
        current_question: Option<QuestionId>,
        events: Vec<AnswerEvent>,
    ) -> Result<Self, SessionStateError> {
        if ended_at.is_some_and(|end| end < started_at) {
            return Err(SessionStateError::InvalidTimeRange);
        }
        if study_time < Duration::zero() {
            return Err(SessionStateError::NegativeStudyTime);
        }

        Ok(Self {
            id,
            quiz_id,
            started_at,
            ended_at,
            is_active,
            study_time,
            current_question,
            events,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn study_time(&self) -> Duration {
        self.study_time
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionId> {
        self.current_question.as_ref()
    }

    /// The answer log in insertion order (not necessarily timestamp order).
    #[must_use]
    pub fn events(&self) -> &[AnswerEvent] {
        &self.events
    }

    /// Append an event to the log.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Inactive` once the session has been finished.
    pub fn record(&mut self, event: AnswerEvent) -> Result<(), SessionStateError> {
        if !self.is_active {
            return Err(SessionStateError::Inactive);
        }
        self.events.push(event);
        Ok(())
    }

    pub fn set_current(&mut self, question: Option<QuestionId>) {
        self.current_question = question;
    }

    /// Accumulate time spent studying. Negative deltas are ignored.
    pub fn add_study_time(&mut self, delta: Duration) {
        if delta > Duration::zero() {
            self.study_time += delta;
        }
    }

    /// Close the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Inactive` if already finished and
    /// `SessionStateError::InvalidTimeRange` if `at` precedes the start.
    pub fn finish(&mut self, at: DateTime<Utc>) -> Result<(), SessionStateError> {
        if !self.is_active {
            return Err(SessionStateError::Inactive);
        }
        if at < self.started_at {
            return Err(SessionStateError::InvalidTimeRange);
        }
        self.ended_at = Some(at);
        self.is_active = false;
        self.current_question = None;
        Ok(())
    }

    /// Drop the whole log and the current pointer, keeping the session open.
    pub fn reset(&mut self) {
        self.events.clear();
        self.current_question = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventId;
    use crate::time::fixed_now;
    use std::collections::BTreeSet;

    fn session() -> QuizSession {
        QuizSession::start(SessionId::new("s1"), QuizId::new("quiz"), fixed_now())
    }

    fn event(question: &str, correct: bool) -> AnswerEvent {
        AnswerEvent::new(
            EventId::generate(),
            QuestionId::new(question),
            fixed_now(),
            BTreeSet::new(),
            correct,
        )
    }

    #[test]
    fn record_appends_in_order() {
        let mut s = session();
        s.record(event("q1", true)).unwrap();
        s.record(event("q2", false)).unwrap();

        let ids: Vec<_> = s.events().iter().map(|e| e.question_id().as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn finished_session_rejects_events() {
        let mut s = session();
        s.set_current(Some(QuestionId::new("q1")));
        s.finish(fixed_now() + Duration::minutes(3)).unwrap();

        assert!(!s.is_active());
        assert_eq!(s.current_question(), None);
        assert_eq!(s.ended_at(), Some(fixed_now() + Duration::minutes(3)));
        assert_eq!(s.record(event("q1", true)), Err(SessionStateError::Inactive));
        assert_eq!(
            s.finish(fixed_now() + Duration::minutes(4)),
            Err(SessionStateError::Inactive)
        );
    }

    #[test]
    fn finish_before_start_is_rejected() {
        let mut s = session();
        let err = s.finish(fixed_now() - Duration::seconds(1)).unwrap_err();
        assert_eq!(err, SessionStateError::InvalidTimeRange);
        assert!(s.is_active());
    }

    #[test]
    fn reset_clears_log_and_pointer() {
        let mut s = session();
        s.record(event("q1", false)).unwrap();
        s.set_current(Some(QuestionId::new("q1")));

        s.reset();

        assert!(s.events().is_empty());
        assert_eq!(s.current_question(), None);
        assert!(s.is_active());
    }

    #[test]
    fn study_time_ignores_negative_deltas() {
        let mut s = session();
        s.add_study_time(Duration::seconds(30));
        s.add_study_time(Duration::seconds(-10));
        assert_eq!(s.study_time(), Duration::seconds(30));
    }

    #[test]
    fn from_persisted_validates_time_range() {
        let err = QuizSession::from_persisted(
            SessionId::new("s1"),
            QuizId::new("quiz"),
            fixed_now(),
            Some(fixed_now() - Duration::hours(1)),
            false,
            Duration::zero(),
            None,
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, SessionStateError::InvalidTimeRange);
    }
}
