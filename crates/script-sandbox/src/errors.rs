use brick_types::ErrorKind;

use crate::state::TransitionError;
use crate::validate::Violation;

/// Failure of one `execute` call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SandboxError {
    #[error("rejected before execution: {message}")]
    Validation {
        message: String,
        violations: Vec<Violation>,
    },

    #[error("execution exceeded its {deadline_ms} ms deadline (aborted after {elapsed_ms} ms)")]
    Timeout { deadline_ms: u64, elapsed_ms: u64 },

    #[error("script error: {message}")]
    Script { message: String },

    #[error("script finished without returning or saving a document")]
    NoOutput,

    #[error("internal sandbox error: {0}")]
    Internal(#[from] TransitionError),
}

impl SandboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SandboxError::Validation { .. } => ErrorKind::Validation,
            SandboxError::Timeout { .. } => ErrorKind::Timeout,
            SandboxError::Script { .. } | SandboxError::Internal(_) => ErrorKind::Script,
            SandboxError::NoOutput => ErrorKind::NoOutput,
        }
    }

    pub(crate) fn script(message: impl Into<String>) -> Self {
        SandboxError::Script {
            message: message.into(),
        }
    }
}
