use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::quiz_service::QuizService;
use crate::randomness::Randomness;
use crate::sessions::SessionLoopService;
use crate::settings_service::UserSettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quizzes: Arc<QuizService>,
    session_loop: Arc<SessionLoopService>,
    settings: Arc<UserSettingsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        randomness: Randomness,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, randomness))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, randomness: Randomness) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, randomness)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, randomness: Randomness) -> Self {
        let quizzes = Arc::new(QuizService::new(Arc::clone(&storage.quizzes)));
        let session_loop = Arc::new(
            SessionLoopService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.sessions),
                Arc::clone(&storage.answer_log),
            )
            .with_randomness(randomness),
        );
        let settings = Arc::new(UserSettingsService::new(Arc::clone(&storage.settings)));

        Self {
            quizzes,
            session_loop,
            settings,
        }
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<UserSettingsService> {
        Arc::clone(&self.settings)
    }
}
