use std::collections::BTreeSet;

use crate::model::{AnswerId, Question};

/// Exact set comparison between the user's selection and the correct answers.
///
/// Single- and multi-select questions are graded the same way; there is no
/// partial credit.
#[must_use]
pub fn is_correct(question: &Question, selected: &BTreeSet<AnswerId>) -> bool {
    question.correct_answer_ids() == *selected
}
