use std::collections::HashMap;

use crate::model::{AnswerEvent, ProgressSettings, Question, QuestionId};
use crate::progress::{all_remaining_attempts, answer_counts};

/// Display-ready view of a session's progress.
///
/// Always built from scratch with [`SessionSnapshot::compute`]; never patch
/// one in place after the log changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub remaining_by_question: HashMap<QuestionId, u32>,
    pub unanswered: Vec<QuestionId>,
    pub mastered: usize,
    pub complete: bool,
    pub correct_total: usize,
    pub wrong_total: usize,
}

impl SessionSnapshot {
    #[must_use]
    pub fn compute(
        questions: &[Question],
        events: &[AnswerEvent],
        settings: &ProgressSettings,
    ) -> Self {
        let remaining_by_question = all_remaining_attempts(questions, events, settings);
        let unanswered: Vec<QuestionId> = questions
            .iter()
            .filter(|q| remaining_by_question.get(&q.id).copied().unwrap_or(0) > 0)
            .map(|q| q.id.clone())
            .collect();
        let mastered = questions
            .iter()
            .filter(|q| remaining_by_question.get(&q.id).copied() == Some(0))
            .count();
        let counts = answer_counts(events);

        Self {
            complete: unanswered.is_empty(),
            remaining_by_question,
            unanswered,
            mastered,
            correct_total: counts.correct,
            wrong_total: counts.wrong,
        }
    }

    /// Number of distinct questions tracked.
    #[must_use]
    pub fn total(&self) -> usize {
        self.remaining_by_question.len()
    }

    /// Share of mastered questions in `[0, 1]`; `1.0` for an empty quiz.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        self.mastered.min(total) as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, AnswerId, EventId};
    use crate::progress::{is_complete, mastered_count};
    use crate::time::fixed_now;
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn question(id: &str, position: u32) -> Question {
        Question::new(
            QuestionId::new(id),
            position,
            id,
            vec![Answer::new(AnswerId::new("a"), 0, "a", true)],
        )
    }

    fn event(question: &str, correct: bool, offset: i64) -> AnswerEvent {
        AnswerEvent::new(
            EventId::generate(),
            QuestionId::new(question),
            fixed_now() + Duration::seconds(offset),
            BTreeSet::new(),
            correct,
        )
    }

    #[test]
    fn snapshot_agrees_with_primitives() {
        let questions = [question("Q1", 0), question("Q2", 1), question("Q3", 2)];
        let events = vec![
            event("Q1", true, 0),
            event("Q2", false, 1),
            event("Q2", true, 2),
        ];
        let settings = ProgressSettings::default();

        let snap = SessionSnapshot::compute(&questions, &events, &settings);

        assert_eq!(snap.mastered, mastered_count(&questions, &events, &settings));
        assert_eq!(snap.complete, is_complete(&questions, &events, &settings));
        assert_eq!(
            snap.unanswered,
            vec![QuestionId::new("Q2"), QuestionId::new("Q3")]
        );
        assert_eq!(snap.correct_total, 2);
        assert_eq!(snap.wrong_total, 1);
        assert_eq!(snap.total(), 3);
    }

    #[test]
    fn recomputing_after_append_reflects_new_event() {
        let questions = [question("Q1", 0)];
        let mut events = vec![event("Q1", false, 0)];
        let settings = ProgressSettings::default();

        let before = SessionSnapshot::compute(&questions, &events, &settings);
        assert!(!before.complete);

        events.push(event("Q1", true, 1));
        events.push(event("Q1", true, 2));
        let after = SessionSnapshot::compute(&questions, &events, &settings);

        assert!(after.complete);
        assert_eq!(after.mastered, 1);
        assert!((after.progress_ratio() - 1.0).abs() < f64::EPSILON);
        assert_eq!(after, SessionSnapshot::compute(&questions, &events, &settings));
    }

    #[test]
    fn empty_quiz_snapshot_is_complete() {
        let snap = SessionSnapshot::compute(&[], &[], &ProgressSettings::default());
        assert!(snap.complete);
        assert_eq!(snap.total(), 0);
        assert!((snap.progress_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
