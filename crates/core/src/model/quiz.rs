use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::{AnswerId, QuestionId, QuizId};

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub position: u32,
    pub body: String,
    pub is_correct: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl Answer {
    #[must_use]
    pub fn new(id: AnswerId, position: u32, body: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id,
            position,
            body: body.into(),
            is_correct,
            image: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A quiz question with its ordered answers.
///
/// `multiple` only tells the UI whether to offer multi-select; grading is
/// the same exact-set comparison either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub position: u32,
    pub body: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub image: Option<String>,
    pub answers: Vec<Answer>,
}

impl Question {
    /// Builds a question, ordering answers by `position`.
    ///
    /// `multiple` is inferred from the number of correct answers and can be
    /// overridden with [`Question::with_multiple`].
    #[must_use]
    pub fn new(
        id: QuestionId,
        position: u32,
        body: impl Into<String>,
        mut answers: Vec<Answer>,
    ) -> Self {
        answers.sort_by_key(|a| a.position);
        let multiple = answers.iter().filter(|a| a.is_correct).count() > 1;
        Self {
            id,
            position,
            body: body.into(),
            explanation: None,
            multiple,
            image: None,
            answers,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    #[must_use]
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Identifiers of every answer flagged correct.
    #[must_use]
    pub fn correct_answer_ids(&self) -> BTreeSet<AnswerId> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.id.clone())
            .collect()
    }

    #[must_use]
    pub fn answer(&self, id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| &a.id == id)
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A titled, ordered set of questions. Read-only once loaded into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Builds a quiz, ordering questions by `position`.
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.position);
        Self {
            id,
            title: title.into(),
            questions,
        }
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
