use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grading;
use crate::model::ids::{AnswerId, EventId, QuestionId};
use crate::model::quiz::Question;

/// One immutable entry of a session's answer log.
///
/// `was_correct` is fixed when the answer is submitted and never recomputed
/// from the stored selection, so later edits to the quiz do not rewrite
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEvent {
    id: EventId,
    question_id: QuestionId,
    answered_at: DateTime<Utc>,
    selected: BTreeSet<AnswerId>,
    was_correct: bool,
}

impl AnswerEvent {
    /// Rehydrate an event from persisted storage.
    #[must_use]
    pub fn new(
        id: EventId,
        question_id: QuestionId,
        answered_at: DateTime<Utc>,
        selected: BTreeSet<AnswerId>,
        was_correct: bool,
    ) -> Self {
        Self {
            id,
            question_id,
            answered_at,
            selected,
            was_correct,
        }
    }

    /// Grade `selected` against `question` and capture the result as a new event.
    #[must_use]
    pub fn record(
        question: &Question,
        selected: BTreeSet<AnswerId>,
        answered_at: DateTime<Utc>,
    ) -> Self {
        let was_correct = grading::is_correct(question, &selected);
        Self::new(
            EventId::generate(),
            question.id.clone(),
            answered_at,
            selected,
            was_correct,
        )
    }

    #[must_use]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn answered_at(&self) -> DateTime<Utc> {
        self.answered_at
    }

    #[must_use]
    pub fn selected(&self) -> &BTreeSet<AnswerId> {
        &self.selected
    }

    #[must_use]
    pub fn was_correct(&self) -> bool {
        self.was_correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;
    use crate::time::fixed_now;

    fn question() -> Question {
        Question::new(
            QuestionId::new("q1"),
            0,
            "2 + 2?",
            vec![
                Answer::new(AnswerId::new("a1"), 0, "4", true),
                Answer::new(AnswerId::new("a2"), 1, "5", false),
            ],
        )
    }

    #[test]
    fn record_grades_once_at_submission() {
        let q = question();
        let right = AnswerEvent::record(&q, BTreeSet::from([AnswerId::new("a1")]), fixed_now());
        let wrong = AnswerEvent::record(&q, BTreeSet::from([AnswerId::new("a2")]), fixed_now());

        assert!(right.was_correct());
        assert!(!wrong.was_correct());
        assert_eq!(right.question_id(), &q.id);
        assert_ne!(right.id(), wrong.id());
    }

    #[test]
    fn stored_verdict_survives_quiz_changes() {
        let mut q = question();
        let event = AnswerEvent::record(&q, BTreeSet::from([AnswerId::new("a1")]), fixed_now());

        q.answers[0].is_correct = false;
        q.answers[1].is_correct = true;

        assert!(event.was_correct());
        assert!(!grading::is_correct(&q, event.selected()));
    }
}
