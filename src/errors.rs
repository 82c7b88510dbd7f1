//! Error types for the journal core.
//!
//! None of these are fatal: the wizard rejects the transition, the quote
//! fetch falls back to a fixed sentence, and the journal loads as empty.

use crate::wizard::Step;
use thiserror::Error;

/// A wizard transition that was refused. State is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Write something about your day before continuing")]
    BlankAnswer,

    #[error("Cannot do that during {actual}; expected {expected}")]
    OutOfStep { expected: Step, actual: Step },

    #[error("Choose whether to do the breathing exercise first")]
    BreathingChoicePending,

    #[error("Stop the breathing exercise before saving")]
    BreathingActive,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("quote request failed: {0}")]
    Network(String),

    #[error("quote response could not be decoded: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("journal store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal store holds malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
}
