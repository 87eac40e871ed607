use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must not be empty", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Opaque string identifier, serialized as a bare string.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Creates a fresh random (UUID v4) identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a Quiz
    QuizId
);
string_id!(
    /// Unique identifier for a Question within a quiz
    QuestionId
);
string_id!(
    /// Unique identifier for an Answer within a question
    AnswerId
);
string_id!(
    /// Unique identifier for a logged AnswerEvent
    EventId
);
string_id!(
    /// Unique identifier for a QuizSession
    SessionId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_display() {
        let id = QuestionId::new("q-1");
        assert_eq!(id.to_string(), "q-1");
        assert_eq!(format!("{id:?}"), "QuestionId(\"q-1\")");
    }

    #[test]
    fn test_answer_id_from_str_trims() {
        let id: AnswerId = "  a-7 ".parse().unwrap();
        assert_eq!(id, AnswerId::new("a-7"));
    }

    #[test]
    fn test_session_id_from_str_rejects_blank() {
        let err = "   ".parse::<SessionId>().unwrap_err();
        assert_eq!(err.to_string(), "SessionId must not be empty");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = QuizId::new("quiz-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"quiz-42\"");
        let back: QuizId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
