use serde::{Deserialize, Serialize};

use brick_types::ErrorKind;

/// Result of finishing one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadOutcome {
    /// The model replaced the display.
    Applied { generation: u64 },
    /// A newer generation was issued; the result was thrown away.
    Stale { generation: u64, latest: u64 },
    /// Nothing to show. The display was not touched.
    Failed {
        generation: u64,
        kind: ErrorKind,
        message: String,
    },
    /// The same identity was already in flight; no load was started.
    Dropped { identity: String },
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

/// Broadcast to subscribers as loads progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoordinatorEvent {
    ModelShown {
        generation: u64,
        identity: String,
        title: Option<String>,
        placements: usize,
    },
    LoadDiscarded {
        generation: u64,
        latest: u64,
    },
    LoadFailed {
        generation: u64,
        kind: ErrorKind,
        message: String,
    },
    DuplicateDropped {
        identity: String,
    },
}
