use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::coordinator::LoadedModel;
use crate::errors::{GenerateError, StoreError};

/// A resolvable reference returned by a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(pub String);

impl DocumentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable storage for documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, reference: &DocumentRef) -> Result<String, StoreError>;

    /// Store `document` under a name derived from `file_name`.
    async fn write(&self, file_name: &str, document: &str) -> Result<DocumentRef, StoreError>;
}

/// Produces script source from a prompt. The output is untrusted.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, parts: &[String]) -> Result<String, GenerateError>;
}

/// Opaque id of something a [`Renderer`] is drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneHandle(pub u64);

/// Display side of the coordinator.
///
/// Called with the coordinator's state lock held, so implementations must
/// not call back into the coordinator.
pub trait Renderer: Send + Sync {
    fn show(&self, model: &LoadedModel) -> SceneHandle;

    /// Stop drawing and updating `handle`. Must be cheap.
    fn detach(&self, handle: SceneHandle);

    /// Release everything held for `handle`. Runs on its own task.
    fn dispose(&self, handle: SceneHandle);
}
