use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use file_format::document_file_name;

use crate::errors::StoreError;
use crate::traits::{DocumentRef, DocumentStore};

/// Stores documents as files in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<slug>-<UTC timestamp>.ldr`, e.g. `small-red-car-20240102T030405123Z.ldr`.
    pub fn stored_name(file_name: &str, at: DateTime<Utc>) -> String {
        let slug = document_file_name(file_name);
        let stem = slug.strip_suffix(".ldr").unwrap_or(&slug);
        format!("{stem}-{}.ldr", at.format("%Y%m%dT%H%M%S%3fZ"))
    }

    fn resolve(&self, reference: &DocumentRef) -> Result<PathBuf, StoreError> {
        let relative = Path::new(reference.as_str());
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if reference.as_str().is_empty() || !plain {
            return Err(StoreError::InvalidReference {
                reference: reference.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn read(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        let path = self.resolve(reference)?;
        debug!(path = %path.display(), "reading document");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    async fn write(&self, file_name: &str, document: &str) -> Result<DocumentRef, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
        let name = Self::stored_name(file_name, Utc::now());
        let path = self.root.join(&name);
        debug!(path = %path.display(), bytes = document.len(), "writing document");
        tokio::fs::write(&path, document)
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        Ok(DocumentRef(name))
    }
}
