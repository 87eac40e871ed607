#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod quiz_service;
pub mod randomness;
pub mod sessions;
pub mod settings_service;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuizServiceError, SessionError, SettingsServiceError};
pub use quiz_service::QuizService;
pub use randomness::Randomness;
pub use sessions::{SessionLoopService, StudySession, SubmissionResult};
pub use settings_service::UserSettingsService;
