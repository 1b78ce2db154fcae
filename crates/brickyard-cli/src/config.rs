use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use load_coordinator::{CoordinatorConfig, PreviewConfig};
use script_sandbox::SandboxConfig;

/// Settings read from `--config`. Missing fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sandbox: SandboxConfig,
    pub coordinator: CoordinatorConfig,
    pub preview: PreviewConfig,
    /// Where saved documents go. Defaults to `./models`.
    pub store_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid config JSON")
    }

    /// Read `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("models"))
    }

    /// Deadline for a run: the flag if given, else the sandbox default.
    pub fn deadline_ms(&self, flag: Option<u64>) -> u64 {
        flag.unwrap_or(self.sandbox.default_deadline_ms)
    }
}
