//! Remaining-attempts derivation by replaying the answer log.
//!
//! For each question the value starts at `initial_reoccurrences`, drops by one
//! (floored at zero) on a correct answer and grows by
//! `wrong_answer_reoccurrences` on a wrong one. Events are replayed in
//! timestamp order; equal timestamps keep their log order.

use std::collections::HashMap;

use crate::model::{AnswerEvent, ProgressSettings, Question, QuestionId};

/// Totals across the whole log, regardless of question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerCounts {
    pub correct: usize,
    pub wrong: usize,
}

impl AnswerCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.correct + self.wrong
    }
}

fn replay(mut history: Vec<&AnswerEvent>, settings: &ProgressSettings) -> u32 {
    // stable: ties keep log order
    history.sort_by_key(|e| e.answered_at());
    history
        .into_iter()
        .fold(settings.initial_reoccurrences, |remaining, event| {
            if event.was_correct() {
                remaining.saturating_sub(1)
            } else {
                remaining.saturating_add(settings.wrong_answer_reoccurrences)
            }
        })
}

/// Further correct answers needed before `question_id` is mastered.
#[must_use]
pub fn remaining_attempts(
    question_id: &QuestionId,
    events: &[AnswerEvent],
    settings: &ProgressSettings,
) -> u32 {
    let history = events
        .iter()
        .filter(|e| e.question_id() == question_id)
        .collect();
    replay(history, settings)
}

/// Remaining attempts for every question, including ones with no events.
///
/// Events pointing at questions outside `questions` are ignored.
#[must_use]
pub fn all_remaining_attempts(
    questions: &[Question],
    events: &[AnswerEvent],
    settings: &ProgressSettings,
) -> HashMap<QuestionId, u32> {
    let mut by_question: HashMap<&QuestionId, Vec<&AnswerEvent>> = HashMap::new();
    for event in events {
        by_question.entry(event.question_id()).or_default().push(event);
    }

    questions
        .iter()
        .map(|q| {
            let history = by_question.get(&q.id).cloned().unwrap_or_default();
            (q.id.clone(), replay(history, settings))
        })
        .collect()
}

/// Questions that still need answers, in their original order.
#[must_use]
pub fn unanswered_questions<'a>(
    questions: &'a [Question],
    events: &[AnswerEvent],
    settings: &ProgressSettings,
) -> Vec<&'a Question> {
    let remaining = all_remaining_attempts(questions, events, settings);
    questions
        .iter()
        .filter(|q| remaining.get(&q.id).copied().unwrap_or(0) > 0)
        .collect()
}

/// True when every question is mastered. An empty quiz is complete.
#[must_use]
pub fn is_complete(
    questions: &[Question],
    events: &[AnswerEvent],
    settings: &ProgressSettings,
) -> bool {
    all_remaining_attempts(questions, events, settings)
        .values()
        .all(|&remaining| remaining == 0)
}

#[must_use]
pub fn mastered_count(
    questions: &[Question],
    events: &[AnswerEvent],
    settings: &ProgressSettings,
) -> usize {
    let remaining = all_remaining_attempts(questions, events, settings);
    questions
        .iter()
        .filter(|q| remaining.get(&q.id).copied() == Some(0))
        .count()
}

#[must_use]
pub fn answer_counts(events: &[AnswerEvent]) -> AnswerCounts {
    events
        .iter()
        .fold(AnswerCounts::default(), |mut counts, event| {
            if event.was_correct() {
                counts.correct += 1;
            } else {
                counts.wrong += 1;
            }
            counts
        })
}

/// Number of log entries whose question is not part of `questions`.
#[must_use]
pub fn orphaned_event_count(questions: &[Question], events: &[AnswerEvent]) -> usize {
    events
        .iter()
        .filter(|e| !questions.iter().any(|q| &q.id == e.question_id()))
        .count()
}
