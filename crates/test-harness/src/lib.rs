//! Shared fixtures for the brickyard crates.
//!
//! # Key Components
//!
//! - [`helpers`]: sample scripts, fixture models, harness error type
//! - [`fakes`]: recording renderer, in-memory and gated stores, canned generator
//! - [`oracle`]: document checks returning pass/fail verdicts
//! - [`report`]: plain-text summaries of a parsed document
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod fakes;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use fakes::{GatedStore, MemoryStore, RecordingRenderer, RenderCall, Rig, ScriptedGenerator};
pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::DocumentReport;
