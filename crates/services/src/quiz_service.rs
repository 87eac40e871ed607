use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::{Quiz, QuizId};
use storage::repository::QuizRepository;

use crate::error::QuizServiceError;

/// Imports and lists quizzes.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    /// Validate and persist a quiz, replacing any quiz with the same id.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` for blank titles or duplicate ids, or if
    /// persistence fails.
    pub async fn import(&self, quiz: Quiz) -> Result<Quiz, QuizServiceError> {
        validate(&quiz)?;
        self.quizzes.upsert_quiz(&quiz).await?;
        tracing::info!(quiz = %quiz.id, questions = quiz.len(), "imported quiz");
        Ok(quiz)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the quiz is missing or storage fails.
    pub async fn get(&self, id: &QuizId) -> Result<Quiz, QuizServiceError> {
        Ok(self.quizzes.get_quiz(id).await?)
    }

    /// List quizzes ordered by title, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn list(&self, limit: u32) -> Result<Vec<Quiz>, QuizServiceError> {
        Ok(self.quizzes.list_quizzes(limit).await?)
    }
}

fn validate(quiz: &Quiz) -> Result<(), QuizServiceError> {
    if quiz.title.trim().is_empty() {
        return Err(QuizServiceError::EmptyTitle);
    }

    let mut questions = HashSet::new();
    for question in &quiz.questions {
        if !questions.insert(&question.id) {
            return Err(QuizServiceError::DuplicateQuestion(question.id.clone()));
        }
        let mut answers = HashSet::new();
        for answer in &question.answers {
            if !answers.insert(&answer.id) {
                return Err(QuizServiceError::DuplicateAnswer {
                    question: question.id.clone(),
                    answer: answer.id.clone(),
                });
            }
        }
    }
    Ok(())
}
