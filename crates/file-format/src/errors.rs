use serde::{Deserialize, Serialize};

/// A line that claims to be a placement but cannot be read as one.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FormatError {
    #[error("line {line}: placement has {found} fields, expected at least {expected}")]
    TooFewFields {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("line {line}: invalid color code {value:?}")]
    InvalidColor { line: usize, value: String },

    #[error("line {line}: field {field} is not a number: {value:?}")]
    InvalidNumber {
        line: usize,
        field: usize,
        value: String,
    },
}

impl FormatError {
    pub fn line(&self) -> usize {
        match self {
            FormatError::TooFewFields { line, .. }
            | FormatError::InvalidColor { line, .. }
            | FormatError::InvalidNumber { line, .. } => *line,
        }
    }
}
