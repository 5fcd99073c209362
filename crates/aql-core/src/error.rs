//! Scoring and session error types.
//!
//! These are the failures callers are expected to match on. File loading and
//! configuration report through `anyhow` instead.

use thiserror::Error;

use crate::model::QuestionType;

/// Errors raised while applying an answer to a score accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The step id is not part of the scorer's step bank.
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// The step exists but takes no answer (intro or results).
    #[error("step '{0}' is not a question")]
    NotAQuestion(String),

    /// The answer's kind cannot be classified against the question type.
    #[error("step '{step_id}' expects a {expected} answer, got {found}")]
    InvalidAnswerKind {
        step_id: String,
        expected: QuestionType,
        found: QuestionType,
    },

    /// A slider answer outside the configured range.
    #[error("step '{step_id}' slider value {value} is outside {min}..={max}")]
    SliderOutOfRange {
        step_id: String,
        value: i64,
        min: u32,
        max: u32,
    },
}

/// Errors raised by an assessment session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Advancing from a question step that has never been answered.
    #[error("step '{0}' must be answered before advancing")]
    AnswerRequired(String),

    /// The session already produced its result.
    #[error("assessment is already complete")]
    Completed,

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl SessionError {
    /// Returns `true` if the user can correct the input and try again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Completed)
    }
}
