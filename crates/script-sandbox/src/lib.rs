//! Runs untrusted builder scripts.
//!
//! A run is two phases: a textual scan against a denylist
//! ([`validate::validate_source`]), then evaluation in a fresh Rhai engine
//! whose only capabilities are the `Builder` constructor and the `COLORS`
//! table. A wall-clock deadline aborts runaway scripts.

pub mod bindings;
pub mod errors;
pub mod sandbox;
pub mod state;
pub mod types;
pub mod validate;

pub use errors::SandboxError;
pub use sandbox::Sandbox;
pub use state::{ExecutionRun, ExecutionState};
pub use types::{Completion, DocumentSink, ExecutionOutput, SandboxConfig, SandboxStats};
pub use validate::{validate_source, ThreatCategory, Violation, ALLOWED_MODULE};
