use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::traits::DocumentRef;

/// What a load starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum LoadPayload {
    /// Script source, run through the sandbox.
    Source(String),
    /// A finished document.
    Document(String),
    /// A document held by the store.
    Stored(DocumentRef),
}

impl LoadPayload {
    /// Content hash for text payloads, the reference for stored ones.
    pub fn identity(&self) -> String {
        match self {
            LoadPayload::Source(text) => content_identity("source", text),
            LoadPayload::Document(text) => content_identity("document", text),
            LoadPayload::Stored(reference) => format!("stored:{reference}"),
        }
    }
}

/// Hex SHA-256 of `text`, prefixed with what kind of text it is.
pub fn content_identity(kind: &str, text: &str) -> String {
    format!("{kind}:{:x}", Sha256::digest(text.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub identity: String,
    pub payload: LoadPayload,
    pub generation: u64,
}
