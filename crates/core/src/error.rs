use thiserror::Error;

use crate::model::{ParseIdError, SessionStateError, SettingsError};

/// Umbrella for the model's validation errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
