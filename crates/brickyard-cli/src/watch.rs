//! `brickyard watch`: re-run a script file whenever it changes.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use load_coordinator::{
    CodeGenerator, Collaborators, Coordinator, CoordinatorEvent, FileStore, GenerateError,
    LivePreview, LoadedModel, Renderer, SceneHandle,
};
use script_sandbox::Sandbox;

use crate::config::AppConfig;

/// Renderer that reports to the log instead of drawing.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    next: AtomicU64,
}

impl Renderer for ConsoleRenderer {
    fn show(&self, model: &LoadedModel) -> SceneHandle {
        let handle = SceneHandle(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        info!(
            handle = handle.0,
            generation = model.generation,
            title = model.title.as_deref().unwrap_or("-"),
            placements = model.placements.len(),
            skipped = model.skipped_lines,
            "showing model"
        );
        handle
    }

    fn detach(&self, handle: SceneHandle) {
        info!(handle = handle.0, "detached");
    }

    fn dispose(&self, handle: SceneHandle) {
        info!(handle = handle.0, "disposed");
    }
}

/// The CLI has no generation backend.
#[derive(Debug, Default)]
pub struct NoGenerator;

#[async_trait]
impl CodeGenerator for NoGenerator {
    async fn generate(&self, _prompt: &str, _parts: &[String]) -> Result<String, GenerateError> {
        Err(GenerateError::Unavailable(
            "no generator is configured".to_string(),
        ))
    }
}

/// Build a coordinator wired to the console and the configured store.
pub fn console_coordinator(config: &AppConfig) -> Coordinator {
    Coordinator::new(
        config.coordinator.clone(),
        Arc::new(Sandbox::new(config.sandbox.clone())),
        Collaborators {
            renderer: Arc::new(ConsoleRenderer::default()),
            store: Arc::new(FileStore::new(config.store_dir())),
            generator: Arc::new(NoGenerator),
        },
    )
}

/// Poll `path` and preview every change until Ctrl-C.
///
/// With `save_as`, the model on display at exit is written to the store.
pub async fn watch(
    config: &AppConfig,
    path: &Path,
    poll: Duration,
    save_as: Option<&str>,
) -> Result<()> {
    let coordinator = console_coordinator(config);
    let mut events = coordinator.subscribe();
    let preview = LivePreview::spawn(coordinator.clone(), config.preview.clone());

    let mut ticker = tokio::time::interval(poll);
    let mut last: Option<String> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(path = %path.display(), "watching");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let text = match tokio::fs::read_to_string(path).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "cannot read script");
                        continue;
                    }
                };
                if last.as_deref() != Some(text.as_str()) {
                    last = Some(text.clone());
                    if !preview.edit(text) {
                        break;
                    }
                }
            }
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(n)) => warn!(missed = n, "event log fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    preview.shutdown().await;
    if let Some(file_name) = save_as {
        let reference = coordinator
            .save_current(file_name)
            .await
            .context("failed to save the displayed model")?;
        info!(%reference, "saved");
    }
    Ok(())
}

fn log_event(event: &CoordinatorEvent) {
    match event {
        CoordinatorEvent::ModelShown { generation, .. } => {
            info!(generation, "preview updated");
        }
        CoordinatorEvent::LoadFailed {
            generation,
            kind,
            message,
        } => error!(generation, %kind, "{message}"),
        other => info!(event = ?other, "coordinator"),
    }
}
