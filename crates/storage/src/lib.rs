#![forbid(unsafe_code)]

//! Persistence for quizzes, sessions, answer logs and user settings.
//!
//! The progress engine never touches storage; services load a log through
//! these traits and hand it to the engine as a plain slice.

pub mod repository;
pub mod sqlite;
