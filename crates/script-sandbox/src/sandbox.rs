use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rhai::{Dynamic, EvalAltResult};
use tracing::{debug, info, instrument, warn};

use brick_types::ColorTable;

use crate::bindings::{ExecutionContext, DEADLINE_TOKEN};
use crate::errors::SandboxError;
use crate::state::{ExecutionRun, ExecutionState};
use crate::types::{Completion, DocumentSink, ExecutionOutput, SandboxConfig, SandboxStats};
use crate::validate::validate_source;

/// Executes builder scripts under a deadline.
///
/// Each call gets its own engine and builder state; nothing leaks between
/// runs except the counters in [`SandboxStats`].
pub struct Sandbox {
    config: SandboxConfig,
    colors: &'static ColorTable,
    stats: Mutex<SandboxStats>,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            colors: ColorTable::standard(),
            stats: Mutex::new(SandboxStats::default()),
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn stats(&self) -> SandboxStats {
        self.stats.lock().clone()
    }

    /// Run `source` and return its document.
    ///
    /// If the script called `save()`, the last saved document is the
    /// result. Otherwise a non-empty string returned by the script (usually
    /// `b.to_document()`) is used. Anything else, including a builder left
    /// as the final value by a trailing mutator call, is
    /// [`SandboxError::NoOutput`].
    pub fn execute(&self, source: &str, deadline_ms: u64) -> Result<ExecutionOutput, SandboxError> {
        self.execute_with_sink(source, deadline_ms, &mut |_: &str| {})
    }

    /// Like [`Sandbox::execute`], also handing a saved document to `sink`.
    #[instrument(skip(self, source, sink), fields(run_id, bytes = source.len()))]
    pub fn execute_with_sink(
        &self,
        source: &str,
        deadline_ms: u64,
        sink: &mut dyn DocumentSink,
    ) -> Result<ExecutionOutput, SandboxError> {
        let mut run = ExecutionRun::new();
        tracing::Span::current().record("run_id", tracing::field::display(run.id()));

        run.advance(ExecutionState::Validating)?;
        if let Err(err) = validate_source(source, deadline_ms, &self.config) {
            run.advance(ExecutionState::Rejected)?;
            self.stats.lock().rejected += 1;
            warn!(error = %err, "script rejected");
            return Err(err);
        }

        run.advance(ExecutionState::Running)?;
        self.stats.lock().runs_started += 1;
        let started = Instant::now();
        let result = self.run_script(&run, source, deadline_ms, started);

        let terminal = match &result {
            Ok(_) => ExecutionState::Completed,
            Err(SandboxError::Timeout { .. }) => ExecutionState::TimedOut,
            Err(_) => ExecutionState::Errored,
        };
        run.advance(terminal)?;
        {
            let mut stats = self.stats.lock();
            match terminal {
                ExecutionState::Completed => stats.completed += 1,
                ExecutionState::TimedOut => stats.timed_out += 1,
                _ => stats.errored += 1,
            }
        }

        match result {
            Ok(output) => {
                for issue in &output.issues {
                    warn!(%issue, "model issue");
                }
                if output.completion == Completion::Saved {
                    sink.save(&output.document);
                }
                info!(
                    placements = output.placements,
                    completion = ?output.completion,
                    elapsed_ms = output.elapsed.as_millis() as u64,
                    "script completed"
                );
                Ok(output)
            }
            Err(err) => {
                warn!(error = %err, "script failed");
                Err(err)
            }
        }
    }

    fn run_script(
        &self,
        run: &ExecutionRun,
        source: &str,
        deadline_ms: u64,
        started: Instant,
    ) -> Result<ExecutionOutput, SandboxError> {
        let deadline = started + Duration::from_millis(deadline_ms);
        let ctx = ExecutionContext::new(self.colors);
        let engine = ctx.engine(&self.config, deadline);

        let ast = engine
            .compile(source)
            .map_err(|e| SandboxError::script(format!("syntax error: {e}")))?;
        let mut scope = ctx.scope();
        let value = engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|e| classify(*e, deadline_ms, started))?;

        let elapsed = started.elapsed();
        let log = ctx.log.borrow().clone();
        let mut slot = ctx.slot.borrow_mut();

        let (document, completion, issues) = if let Some(document) = slot.document.take() {
            debug!(saves = slot.saves, "using saved document");
            (document, Completion::Saved, std::mem::take(&mut slot.issues))
        } else if value.is_string() {
            let text = value.into_string().unwrap_or_default();
            if text.trim().is_empty() {
                return Err(SandboxError::NoOutput);
            }
            (text, Completion::Returned, Vec::new())
        } else {
            return Err(SandboxError::NoOutput);
        };

        Ok(ExecutionOutput {
            run_id: run.id(),
            placements: file_format::parse_placements(&document).len(),
            document,
            completion,
            issues,
            log,
            elapsed,
        })
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

/// Map an engine error to the sandbox taxonomy.
fn classify(err: EvalAltResult, deadline_ms: u64, started: Instant) -> SandboxError {
    match root_cause(&err) {
        EvalAltResult::ErrorTerminated(token, _) if token.to_string() == DEADLINE_TOKEN => {
            SandboxError::Timeout {
                deadline_ms,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        }
        EvalAltResult::ErrorRuntime(value, pos) => {
            SandboxError::script(format!("uncaught exception: {value} ({pos})"))
        }
        _ => SandboxError::script(err.to_string()),
    }
}

fn root_cause(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _)
        | EvalAltResult::ErrorInModule(_, inner, _) => root_cause(inner),
        other => other,
    }
}
