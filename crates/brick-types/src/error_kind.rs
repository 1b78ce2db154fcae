use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-facing failure category. Paired with a message wherever a failure
/// crosses a component boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A disallowed pattern was found before execution.
    Validation,
    /// The execution deadline passed and the run was aborted.
    Timeout,
    /// The script itself raised an error.
    Script,
    /// The run finished without returning or saving a document.
    NoOutput,
    /// A placement line was malformed.
    Format,
    /// The persistence layer failed.
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Script => "script",
            ErrorKind::NoOutput => "no_output",
            ErrorKind::Format => "format",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
