//! Errors raised by the rules of the game.

use thiserror::Error;

use crate::entities::CharacterId;

/// Violations of the game rules. Every operation that returns one of these leaves the
/// state it was called on untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The requested action is not allowed in the current phase or interview state.
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: String, state: String },

    /// The id does not belong to the current cast.
    #[error("unknown character: {0}")]
    UnknownCharacter(CharacterId),

    /// Settings outside the configured bounds.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A cast or scenario that breaks the structural rules of a case.
    #[error("invalid case: {0}")]
    InvalidCase(String),
}

impl RulesError {
    /// Create an InvalidTransition error.
    pub fn transition(action: impl Into<String>, state: impl ToString) -> Self {
        Self::InvalidTransition {
            action: action.into(),
            state: state.to_string(),
        }
    }

    /// Create a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an InvalidCase error.
    pub fn invalid_case(message: impl Into<String>) -> Self {
        Self::InvalidCase(message.into())
    }
}
