use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for either reoccurrence knob.
pub const MAX_REOCCURRENCES: u32 = 100;

/// Thresholds that drive remaining-attempts derivation.
///
/// - `initial_reoccurrences`: correct answers needed for a question nobody has answered yet.
/// - `wrong_answer_reoccurrences`: attempts added back after each wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSettings {
    pub initial_reoccurrences: u32,
    pub wrong_answer_reoccurrences: u32,
}

impl ProgressSettings {
    #[must_use]
    pub fn new(initial_reoccurrences: u32, wrong_answer_reoccurrences: u32) -> Self {
        Self {
            initial_reoccurrences,
            wrong_answer_reoccurrences,
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("{field} must be at most {max}, got {provided}", max = MAX_REOCCURRENCES)]
    TooManyReoccurrences { field: &'static str, provided: u32 },
}

/// Per-user study preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    sync_progress: bool,
    initial_reoccurrences: u32,
    wrong_answer_reoccurrences: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct UserSettingsDraft {
    pub sync_progress: bool,
    pub initial_reoccurrences: u32,
    pub wrong_answer_reoccurrences: u32,
}

impl Default for UserSettingsDraft {
    fn default() -> Self {
        let defaults = UserSettings::default();
        Self {
            sync_progress: defaults.sync_progress,
            initial_reoccurrences: defaults.initial_reoccurrences,
            wrong_answer_reoccurrences: defaults.wrong_answer_reoccurrences,
        }
    }
}

impl UserSettingsDraft {
    /// Validate the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::TooManyReoccurrences` if either knob exceeds
    /// [`MAX_REOCCURRENCES`].
    pub fn validate(self) -> Result<UserSettings, SettingsError> {
        check_bound("initial_reoccurrences", self.initial_reoccurrences)?;
        check_bound("wrong_answer_reoccurrences", self.wrong_answer_reoccurrences)?;

        Ok(UserSettings {
            sync_progress: self.sync_progress,
            initial_reoccurrences: self.initial_reoccurrences,
            wrong_answer_reoccurrences: self.wrong_answer_reoccurrences,
        })
    }
}

impl UserSettings {
    /// Rehydrate settings from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the stored values are out of range.
    pub fn from_persisted(draft: UserSettingsDraft) -> Result<Self, SettingsError> {
        draft.validate()
    }

    #[must_use]
    pub fn sync_progress(&self) -> bool {
        self.sync_progress
    }

    #[must_use]
    pub fn initial_reoccurrences(&self) -> u32 {
        self.initial_reoccurrences
    }

    #[must_use]
    pub fn wrong_answer_reoccurrences(&self) -> u32 {
        self.wrong_answer_reoccurrences
    }

    /// The subset of settings the progress engine consumes.
    #[must_use]
    pub fn progress(&self) -> ProgressSettings {
        ProgressSettings::new(self.initial_reoccurrences, self.wrong_answer_reoccurrences)
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sync_progress: true,
            initial_reoccurrences: 1,
            wrong_answer_reoccurrences: 1,
        }
    }
}

fn check_bound(field: &'static str, provided: u32) -> Result<(), SettingsError> {
    if provided > MAX_REOCCURRENCES {
        return Err(SettingsError::TooManyReoccurrences { field, provided });
    }
    Ok(())
}
