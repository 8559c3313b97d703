//!
//! Error codes
//!

use std::str::Utf8Error;

use thiserror::Error;

use crate::StateNumber;

/// Errors produced while building or querying an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A DFA must be built from exactly one of a regex or an NFA.
    #[error("invalid DFA arguments: {0}")]
    InvalidArguments(&'static str),

    /// The state does not belong to the automaton.
    #[error("the state {0} is not valid")]
    InvalidState(StateNumber),

    /// The pattern could not be turned into an expression.
    #[error("invalid regex `{regex}`: {reason}")]
    InvalidRegex { regex: String, reason: String },

    /// Simulation input was not text.
    #[error("input is not valid text: {0}")]
    InvalidInput(#[from] Utf8Error),
}

impl Error {
    pub(crate) fn invalid_regex<R: Into<String>, S: Into<String>>(regex: R, reason: S) -> Self {
        Error::InvalidRegex {
            regex: regex.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
