//! In-process stand-ins for the coordinator's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use load_coordinator::{
    CodeGenerator, Collaborators, Coordinator, CoordinatorConfig, DocumentRef, DocumentStore,
    GenerateError, LoadedModel, Renderer, SceneHandle, StoreError,
};
use script_sandbox::{Sandbox, SandboxConfig};

// ── Renderer ────────────────────────────────────────────────────────────────

/// One call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Show {
        handle: SceneHandle,
        generation: u64,
        title: Option<String>,
    },
    Detach(SceneHandle),
    Dispose(SceneHandle),
}

/// Records every call in order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: AtomicU64,
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Titles passed to `show`, oldest first.
    pub fn shown_titles(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RenderCall::Show { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn disposed(&self) -> Vec<SceneHandle> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RenderCall::Dispose(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    pub fn show_count(&self) -> usize {
        self.shown_titles().len()
    }
}

impl Renderer for RecordingRenderer {
    fn show(&self, model: &LoadedModel) -> SceneHandle {
        let handle = SceneHandle(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.calls.lock().push(RenderCall::Show {
            handle,
            generation: model.generation,
            title: model.title.clone(),
        });
        handle
    }

    fn detach(&self, handle: SceneHandle) {
        self.calls.lock().push(RenderCall::Detach(handle));
    }

    fn dispose(&self, handle: SceneHandle) {
        self.calls.lock().push(RenderCall::Dispose(handle));
    }
}

// ── Stores ──────────────────────────────────────────────────────────────────

/// Documents kept in a map, written under the caller's file name as given.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: &str, document: impl Into<String>) -> DocumentRef {
        self.docs.lock().insert(reference.to_string(), document.into());
        DocumentRef::new(reference)
    }

    pub fn get(&self, reference: &str) -> Option<String> {
        self.docs.lock().get(reference).cloned()
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        self.get(reference.as_str()).ok_or_else(|| StoreError::NotFound {
            reference: reference.to_string(),
        })
    }

    async fn write(&self, file_name: &str, document: &str) -> Result<DocumentRef, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.insert(file_name, document))
    }
}

/// A [`MemoryStore`] whose reads of chosen references block until released.
///
/// Used to force loads to complete out of order.
#[derive(Debug, Default)]
pub struct GatedStore {
    inner: MemoryStore,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: &str, document: impl Into<String>) -> DocumentRef {
        self.inner.insert(reference, document)
    }

    /// Hold reads of `reference` until [`GatedStore::release`] is called.
    pub fn gate(&self, reference: &str) {
        self.gates
            .lock()
            .insert(reference.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, reference: &str) {
        if let Some(gate) = self.gates.lock().get(reference) {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn read(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        let gate = self.gates.lock().get(reference.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.inner.read(reference).await
    }

    async fn write(&self, file_name: &str, document: &str) -> Result<DocumentRef, StoreError> {
        self.inner.write(file_name, document).await
    }
}

// ── Generator ───────────────────────────────────────────────────────────────

/// Returns canned scripts in order, then reports itself unavailable.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    scripts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scripts: Vec<String> = scripts.into_iter().map(Into::into).collect();
        scripts.reverse();
        Self {
            scripts: Mutex::new(scripts),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every `(prompt, parts)` received.
    pub fn prompts(&self) -> Vec<(String, Vec<String>)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CodeGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, parts: &[String]) -> Result<String, GenerateError> {
        self.prompts
            .lock()
            .push((prompt.to_string(), parts.to_vec()));
        self.scripts
            .lock()
            .pop()
            .ok_or_else(|| GenerateError::Unavailable("no scripts left".into()))
    }
}

// ── Rig ─────────────────────────────────────────────────────────────────────

/// A coordinator wired to fakes, with handles to inspect them.
pub struct Rig<S> {
    pub coordinator: Coordinator,
    pub renderer: Arc<RecordingRenderer>,
    pub store: Arc<S>,
    pub generator: Arc<ScriptedGenerator>,
    pub sandbox: Arc<Sandbox>,
}

impl<S> Rig<S>
where
    S: DocumentStore + 'static,
{
    pub fn with_store(store: S, generator: ScriptedGenerator) -> Self {
        let renderer = Arc::new(RecordingRenderer::new());
        let store = Arc::new(store);
        let generator = Arc::new(generator);
        let sandbox = Arc::new(Sandbox::new(SandboxConfig::default()));
        let coordinator = Coordinator::new(
            CoordinatorConfig {
                deadline_ms: 2_000,
                ..CoordinatorConfig::default()
            },
            sandbox.clone(),
            Collaborators {
                renderer: renderer.clone(),
                store: store.clone(),
                generator: generator.clone(),
            },
        );
        Self {
            coordinator,
            renderer,
            store,
            generator,
            sandbox,
        }
    }
}

impl Rig<MemoryStore> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), ScriptedGenerator::default())
    }
}

impl Default for Rig<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}
