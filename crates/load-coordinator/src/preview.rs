use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::coordinator::Coordinator;
use crate::events::LoadOutcome;
use crate::request::LoadPayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet window after the last edit before a run starts.
    pub quiet_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { quiet_ms: 500 }
    }
}

/// Debounced preview of edited script source.
///
/// Every [`LivePreview::edit`] restarts the quiet window; when it elapses the
/// latest source is loaded. A preview that is still running when the next
/// one starts is left to finish; the newer generation makes its result stale.
pub struct LivePreview {
    edits: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl LivePreview {
    /// Start the worker task. Must be called within a Tokio runtime.
    pub fn spawn(coordinator: Coordinator, config: PreviewConfig) -> Self {
        let (edits, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(
            coordinator,
            Duration::from_millis(config.quiet_ms),
            rx,
        ));
        Self { edits, worker }
    }

    /// Record new source text. Returns `false` once the worker has stopped.
    pub fn edit(&self, source: impl Into<String>) -> bool {
        self.edits.send(source.into()).is_ok()
    }

    /// Stop accepting edits and wait for any pending or running preview.
    pub async fn shutdown(self) {
        drop(self.edits);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "preview worker stopped abnormally");
        }
    }
}

async fn run_worker(
    coordinator: Coordinator,
    quiet: Duration,
    mut edits: mpsc::UnboundedReceiver<String>,
) {
    let mut pending: Option<String> = None;
    let mut in_flight: Option<JoinHandle<LoadOutcome>> = None;

    loop {
        let Some(source) = pending.take() else {
            match edits.recv().await {
                Some(source) => {
                    pending = Some(source);
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            next = edits.recv() => match next {
                Some(newer) => {
                    trace!("edit restarted the quiet window");
                    pending = Some(newer);
                }
                // Closed with an edit waiting: run it before stopping.
                None => {
                    in_flight = start(&coordinator, source, in_flight.take()).await;
                    break;
                }
            },
            _ = sleep(quiet) => {
                in_flight = start(&coordinator, source, in_flight.take()).await;
            }
        }
    }

    if let Some(handle) = in_flight {
        join_preview(handle).await;
    }
}

/// Claim a generation for `source`, wait out the previous run, then spawn.
async fn start(
    coordinator: &Coordinator,
    source: String,
    previous: Option<JoinHandle<LoadOutcome>>,
) -> Option<JoinHandle<LoadOutcome>> {
    let payload = LoadPayload::Source(source);
    let Some(request) = coordinator.begin(payload.identity(), payload) else {
        return previous;
    };
    if let Some(handle) = previous {
        debug!(generation = request.generation, "waiting for previous preview");
        join_preview(handle).await;
    }
    let coordinator = coordinator.clone();
    Some(tokio::spawn(async move { coordinator.run(request).await }))
}

/// Wait for a preview load; a panicked one is logged and otherwise ignored.
async fn join_preview(handle: JoinHandle<LoadOutcome>) {
    match handle.await {
        Ok(outcome) => trace!(?outcome, "previous preview finished"),
        Err(e) => warn!(error = %e, "preview load task failed"),
    }
}
