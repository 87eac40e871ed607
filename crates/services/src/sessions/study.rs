use chrono::{DateTime, Utc};
use quiz_core::history::RecentAnswers;
use quiz_core::model::{ProgressSettings, Question, Quiz, QuizSession};
use quiz_core::progress::orphaned_event_count;
use quiz_core::shuffle::{answer_seed, shuffle};
use quiz_core::snapshot::SessionSnapshot;

/// A quiz paired with one of its sessions, plus what is on screen.
///
/// The presented question is a copy with its answers in display order. Its
/// id always matches the session's current-question pointer.
#[derive(Debug, Clone)]
pub struct StudySession {
    quiz: Quiz,
    pub(crate) session: QuizSession,
    pub(crate) presented: Option<Question>,
    pub(crate) presented_at: Option<DateTime<Utc>>,
}

impl StudySession {
    /// Pair a quiz with a loaded session.
    ///
    /// A persisted current question is presented again with a stable answer
    /// order derived from the question and session ids.
    #[must_use]
    pub fn new(quiz: Quiz, session: QuizSession) -> Self {
        let presented = session
            .current_question()
            .and_then(|id| quiz.question(id))
            .map(|q| {
                let mut shown = q.clone();
                shown.answers = shuffle(&q.answers, &answer_seed(&q.id, session.id()));
                shown
            });
        Self {
            quiz,
            session,
            presented,
            presented_at: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// The question awaiting an answer, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.presented.as_ref()
    }

    /// Recompute progress from the full log.
    #[must_use]
    pub fn snapshot(&self, settings: &ProgressSettings) -> SessionSnapshot {
        let orphans = orphaned_event_count(&self.quiz.questions, self.session.events());
        if orphans > 0 {
            tracing::warn!(
                session = %self.session.id(),
                orphans,
                "answer log references questions missing from the quiz"
            );
        }
        SessionSnapshot::compute(&self.quiz.questions, self.session.events(), settings)
    }

    #[must_use]
    pub fn recent(&self, capacity: usize) -> RecentAnswers {
        RecentAnswers::from_log(self.session.events(), capacity)
    }
}
