use std::sync::Arc;

use quiz_core::model::{UserSettings, UserSettingsDraft};
use storage::repository::UserSettingsRepository;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct UserSettingsService {
    repo: Arc<dyn UserSettingsRepository>,
}

impl UserSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn UserSettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<UserSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: UserSettingsDraft,
    ) -> Result<UserSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}
