//! Error types for form staging and submission

use thiserror::Error;

use crate::form::FormPhase;

/// Rejection of the "add item" form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Please fill all required item fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Rate cannot be negative")]
    NegativeRate,

    #[error("Line item not found")]
    NotFound,
}

/// Client-side reasons a document cannot be submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please fill all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Failed to build request payload: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SubmitError {
    fn from(err: serde_json::Error) -> Self {
        SubmitError::Serialization(err.to_string())
    }
}

/// A page tried to move between phases out of order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid form transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: FormPhase,
    pub to: FormPhase,
}
