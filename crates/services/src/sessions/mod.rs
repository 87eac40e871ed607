mod study;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use study::StudySession;
pub use workflow::{SessionLoopService, SubmissionResult};
