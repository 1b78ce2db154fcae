use std::path::PathBuf;

use brick_types::ErrorKind;
use script_sandbox::SandboxError;

/// Persistence failures. The underlying I/O error is kept as the source.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no document at {reference}")]
    NotFound { reference: String },

    #[error("invalid document reference: {reference}")]
    InvalidReference { reference: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("code generator unavailable: {0}")]
    Unavailable(String),

    #[error("code generator returned no source")]
    Empty,
}

/// Why a single load produced nothing to show.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("document contains no part placements")]
    EmptyDocument,

    #[error("no model is displayed")]
    NothingDisplayed,

    #[error("load task failed: {0}")]
    Task(String),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Sandbox(e) => e.kind(),
            LoadError::Store(_) => ErrorKind::Io,
            LoadError::EmptyDocument => ErrorKind::Format,
            LoadError::NothingDisplayed => ErrorKind::NoOutput,
            LoadError::Task(_) => ErrorKind::Script,
        }
    }
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(e: tokio::task::JoinError) -> Self {
        LoadError::Task(e.to_string())
    }
}
