use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::{AnswerEvent, ProgressSettings, Question, QuestionId};
use crate::progress::unanswered_questions;
use crate::shuffle::shuffle_with;

/// Pick the next question to present, or `None` once every question is mastered.
///
/// The question currently on screen is skipped unless it is the only one
/// left. The choice is uniform over the remaining candidates, and the
/// returned copy has its answers shuffled with the same generator. Pass a
/// seeded generator for reproducible picks.
pub fn pick_next<R: Rng + ?Sized>(
    questions: &[Question],
    events: &[AnswerEvent],
    settings: &ProgressSettings,
    current: Option<&QuestionId>,
    rng: &mut R,
) -> Option<Question> {
    let unanswered = unanswered_questions(questions, events, settings);
    if unanswered.is_empty() {
        return None;
    }

    let others: Vec<&Question> = unanswered
        .iter()
        .copied()
        .filter(|q| Some(&q.id) != current)
        .collect();
    let candidates = if others.is_empty() { unanswered } else { others };

    let chosen = *candidates.choose(rng)?;
    let mut next = chosen.clone();
    next.answers = shuffle_with(&chosen.answers, rng);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, AnswerId, EventId};
    use crate::shuffle::seeded_rng;
    use crate::time::fixed_now;
    use std::collections::BTreeSet;

    fn question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            0,
            id,
            (0..4)
                .map(|i| Answer::new(AnswerId::new(format!("{id}-a{i}")), i, "x", i == 0))
                .collect(),
        )
    }

    fn correct(question: &str) -> AnswerEvent {
        AnswerEvent::new(
            EventId::generate(),
            QuestionId::new(question),
            fixed_now(),
            BTreeSet::new(),
            true,
        )
    }

    #[test]
    fn returns_none_when_everything_is_mastered() {
        let questions = [question("Q1")];
        let events = vec![correct("Q1")];
        let mut rng = seeded_rng("t");
        assert!(pick_next(&questions, &events, &ProgressSettings::default(), None, &mut rng).is_none());
    }

    #[test]
    fn returns_none_for_empty_quiz() {
        let mut rng = seeded_rng("t");
        assert!(pick_next(&[], &[], &ProgressSettings::default(), None, &mut rng).is_none());
    }

    #[test]
    fn falls_back_to_current_when_it_is_the_only_one_left() {
        let questions = [question("Q1"), question("Q2")];
        let events = vec![correct("Q1")];
        let current = QuestionId::new("Q2");
        let mut rng = seeded_rng("t");

        let next = pick_next(
            &questions,
            &events,
            &ProgressSettings::default(),
            Some(&current),
            &mut rng,
        )
        .unwrap();
        assert_eq!(next.id, current);
    }

    #[test]
    fn skips_current_question_when_alternatives_exist() {
        let questions = [question("Q1"), question("Q2"), question("Q3")];
        let current = QuestionId::new("Q2");
        for seed in 0..50 {
            let mut rng = seeded_rng(&seed.to_string());
            let next = pick_next(
                &questions,
                &[],
                &ProgressSettings::default(),
                Some(&current),
                &mut rng,
            )
            .unwrap();
            assert_ne!(next.id, current);
        }
    }

    #[test]
    fn never_picks_mastered_questions() {
        let questions = [question("Q1"), question("Q2"), question("Q3")];
        let events = vec![correct("Q1"), correct("Q3")];
        for seed in 0..20 {
            let mut rng = seeded_rng(&format!("m{seed}"));
            let next =
                pick_next(&questions, &events, &ProgressSettings::default(), None, &mut rng)
                    .unwrap();
            assert_eq!(next.id, QuestionId::new("Q2"));
        }
    }

    #[test]
    fn seeded_generator_makes_picks_reproducible() {
        let questions: Vec<_> = (0..6).map(|i| question(&format!("Q{i}"))).collect();
        let settings = ProgressSettings::default();
        let a = pick_next(&questions, &[], &settings, None, &mut seeded_rng("replay"));
        let b = pick_next(&questions, &[], &settings, None, &mut seeded_rng("replay"));
        assert_eq!(a, b);
    }

    #[test]
    fn picked_question_keeps_all_answers() {
        let questions = [question("Q1")];
        let mut rng = seeded_rng("answers");
        let next =
            pick_next(&questions, &[], &ProgressSettings::default(), None, &mut rng).unwrap();

        let mut got: Vec<_> = next.answers.iter().map(|a| a.id.clone()).collect();
        let mut want: Vec<_> = questions[0].answers.iter().map(|a| a.id.clone()).collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert_eq!(next.correct_answer_ids(), questions[0].correct_answer_ids());
    }
}
