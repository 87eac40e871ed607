mod event;
mod ids;
mod quiz;
mod session;
mod settings;

pub use ids::{AnswerId, EventId, ParseIdError, QuestionId, QuizId, SessionId};

pub use event::AnswerEvent;
pub use quiz::{Answer, Question, Quiz};
pub use session::{QuizSession, SessionStateError};
pub use settings::{
    MAX_REOCCURRENCES, ProgressSettings, SettingsError, UserSettings, UserSettingsDraft,
};
