#![forbid(unsafe_code)]

//! Event-sourced progress engine for quiz study sessions.
//!
//! Every scheduling decision is derived from the full answer log on each
//! call; nothing here keeps per-question counters.

pub mod error;
pub mod grading;
pub mod history;
pub mod model;
pub mod progress;
pub mod selector;
pub mod shuffle;
pub mod snapshot;
pub mod time;

pub use error::Error;
pub use time::Clock;
