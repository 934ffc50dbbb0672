use crate::model::Direction;
use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QhError>;

/// Every failure aborts the running stage; nothing is emitted after one of these.
#[derive(Error, Debug)]
pub enum QhError {
    #[error("input error: {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("malformed record #{index} in {origin}: {reason}")]
    MalformedRecord {
        origin: String,
        index: usize,
        reason: String,
    },

    #[error("slot budget exceeded for {direction} table: {required} entries kept, budget is {budget}")]
    SlotBudgetExceeded {
        direction: Direction,
        required: usize,
        budget: u16,
    },

    #[error("duplicate header name in {direction} table: {name}")]
    DuplicateName { direction: Direction, name: String },

    #[error("table invariant violated: {0}")]
    InvariantViolation(String),
}

impl QhError {
    pub fn input(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        QhError::Input {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(origin: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        QhError::MalformedRecord {
            origin: origin.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Process exit status for the binaries. Each kind maps to its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            QhError::Input { .. } => 2,
            QhError::MalformedRecord { .. } => 3,
            QhError::SlotBudgetExceeded { .. } => 4,
            QhError::DuplicateName { .. } => 5,
            QhError::InvariantViolation(_) => 6,
        }
    }
}
