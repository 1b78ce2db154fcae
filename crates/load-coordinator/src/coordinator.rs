use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use brick_types::ColorTable;
use file_format::{parse_document, to_render_space, RenderPlacement};
use script_sandbox::Sandbox;

use crate::errors::{GenerateError, LoadError};
use crate::events::{CoordinatorEvent, LoadOutcome};
use crate::request::{LoadPayload, LoadRequest};
use crate::traits::{CodeGenerator, DocumentRef, DocumentStore, Renderer, SceneHandle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Deadline handed to the sandbox for source payloads.
    pub deadline_ms: u64,
    /// Buffered events per subscriber before the slowest one lags.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 5_000,
            event_capacity: 64,
        }
    }
}

/// A resolved load, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedModel {
    pub generation: u64,
    pub identity: String,
    pub title: Option<String>,
    pub document: String,
    pub placements: Vec<RenderPlacement>,
    /// Lines that looked like placements but could not be read.
    pub skipped_lines: usize,
}

/// External services the coordinator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn Renderer>,
    pub store: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn CodeGenerator>,
}

struct Displayed {
    handle: SceneHandle,
    model: Arc<LoadedModel>,
}

#[derive(Default)]
struct State {
    latest_issued: u64,
    in_flight: HashMap<String, u64>,
    displayed: Option<Displayed>,
}

struct Inner {
    config: CoordinatorConfig,
    sandbox: Arc<Sandbox>,
    collaborators: Collaborators,
    state: Mutex<State>,
    events: broadcast::Sender<CoordinatorEvent>,
}

/// Owns the single display slot.
///
/// Cloning is cheap and every clone drives the same slot. The state lock is
/// never held across an `.await`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, sandbox: Arc<Sandbox>, collaborators: Collaborators) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                sandbox,
                collaborators,
                state: Mutex::new(State::default()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn sandbox(&self) -> &Arc<Sandbox> {
        &self.inner.sandbox
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }

    pub fn latest_generation(&self) -> u64 {
        self.inner.state.lock().latest_issued
    }

    pub fn displayed(&self) -> Option<Arc<LoadedModel>> {
        self.inner
            .state
            .lock()
            .displayed
            .as_ref()
            .map(|d| d.model.clone())
    }

    pub fn is_in_flight(&self, identity: &str) -> bool {
        self.inner.state.lock().in_flight.contains_key(identity)
    }

    fn emit(&self, event: CoordinatorEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Claim the next generation for `identity`.
    ///
    /// Returns `None` when a load with the same identity is still in flight.
    pub fn begin(&self, identity: impl Into<String>, payload: LoadPayload) -> Option<LoadRequest> {
        let identity = identity.into();
        let request = {
            let mut state = self.inner.state.lock();
            if state.in_flight.contains_key(&identity) {
                None
            } else {
                state.latest_issued += 1;
                let generation = state.latest_issued;
                state.in_flight.insert(identity.clone(), generation);
                Some(LoadRequest {
                    identity: identity.clone(),
                    payload,
                    generation,
                })
            }
        };
        match &request {
            Some(r) => debug!(identity = %r.identity, generation = r.generation, "load started"),
            None => {
                debug!(%identity, "duplicate load dropped");
                self.emit(CoordinatorEvent::DuplicateDropped { identity });
            }
        }
        request
    }

    /// Turn a request's payload into a renderable model. Touches no state.
    pub async fn resolve(&self, request: &LoadRequest) -> Result<LoadedModel, LoadError> {
        let document = match &request.payload {
            LoadPayload::Document(text) => text.clone(),
            LoadPayload::Stored(reference) => self.inner.collaborators.store.read(reference).await?,
            LoadPayload::Source(source) => {
                let sandbox = self.inner.sandbox.clone();
                let source = source.clone();
                let deadline_ms = self.inner.config.deadline_ms;
                let output =
                    tokio::task::spawn_blocking(move || sandbox.execute(&source, deadline_ms))
                        .await??;
                output.document
            }
        };

        let parsed = parse_document(&document);
        let colors = ColorTable::standard();
        let placements: Vec<RenderPlacement> = parsed
            .placements()
            .map(|p| to_render_space(p, colors))
            .collect();
        if placements.is_empty() {
            return Err(LoadError::EmptyDocument);
        }
        if !parsed.skipped.is_empty() {
            warn!(skipped = parsed.skipped.len(), "document has unreadable placement lines");
        }

        Ok(LoadedModel {
            generation: request.generation,
            identity: request.identity.clone(),
            title: parsed.header.title,
            skipped_lines: parsed.skipped.len(),
            document,
            placements,
        })
    }

    /// Finish a request, replacing the display if it is still the newest.
    ///
    /// The outgoing scene is detached before this returns; its disposal runs
    /// on a separate task. Must be called from within a Tokio runtime.
    pub fn complete(
        &self,
        request: LoadRequest,
        result: Result<LoadedModel, LoadError>,
    ) -> LoadOutcome {
        let renderer = self.inner.collaborators.renderer.clone();
        let mut state = self.inner.state.lock();
        if state.in_flight.get(&request.identity) == Some(&request.generation) {
            state.in_flight.remove(&request.identity);
        }
        let generation = request.generation;

        let model = match result {
            Ok(model) => model,
            Err(err) => {
                drop(state);
                warn!(generation, error = %err, "load failed; keeping current model");
                let (kind, message) = (err.kind(), err.to_string());
                self.emit(CoordinatorEvent::LoadFailed {
                    generation,
                    kind,
                    message: message.clone(),
                });
                return LoadOutcome::Failed {
                    generation,
                    kind,
                    message,
                };
            }
        };

        let latest = state.latest_issued;
        if generation != latest {
            drop(state);
            debug!(generation, latest, "stale load discarded");
            self.emit(CoordinatorEvent::LoadDiscarded { generation, latest });
            return LoadOutcome::Stale { generation, latest };
        }

        let model = Arc::new(model);
        let handle = renderer.show(&model);
        let previous = state.displayed.replace(Displayed {
            handle,
            model: model.clone(),
        });
        if let Some(old) = &previous {
            renderer.detach(old.handle);
        }
        drop(state);

        if let Some(old) = previous {
            tokio::spawn(async move {
                renderer.dispose(old.handle);
            });
        }

        info!(
            generation,
            placements = model.placements.len(),
            title = model.title.as_deref().unwrap_or(""),
            "model shown"
        );
        self.emit(CoordinatorEvent::ModelShown {
            generation,
            identity: model.identity.clone(),
            title: model.title.clone(),
            placements: model.placements.len(),
        });
        LoadOutcome::Applied { generation }
    }

    /// Resolve and complete an already started request.
    pub async fn run(&self, request: LoadRequest) -> LoadOutcome {
        let result = self.resolve(&request).await;
        self.complete(request, result)
    }

    /// Start, resolve and complete a load.
    #[instrument(skip(self, payload), fields(identity))]
    pub async fn load(&self, payload: LoadPayload) -> LoadOutcome {
        let identity = payload.identity();
        tracing::Span::current().record("identity", identity.as_str());
        match self.begin(identity.clone(), payload) {
            Some(request) => self.run(request).await,
            None => LoadOutcome::Dropped { identity },
        }
    }

    /// Ask the generator for a script and load it.
    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    pub async fn generate_and_load(
        &self,
        prompt: &str,
        parts: &[String],
    ) -> Result<LoadOutcome, GenerateError> {
        let source = self
            .inner
            .collaborators
            .generator
            .generate(prompt, parts)
            .await?;
        if source.trim().is_empty() {
            return Err(GenerateError::Empty);
        }
        Ok(self.load(LoadPayload::Source(source)).await)
    }

    /// Persist the displayed document.
    pub async fn save_current(&self, file_name: &str) -> Result<DocumentRef, LoadError> {
        let document = self
            .displayed()
            .map(|m| m.document.clone())
            .ok_or(LoadError::NothingDisplayed)?;
        let reference = self
            .inner
            .collaborators
            .store
            .write(file_name, &document)
            .await?;
        info!(%reference, "document saved");
        Ok(reference)
    }
}
