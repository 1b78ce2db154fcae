//! Static pre-check of script text.
//!
//! The scan is purely textual: a match anywhere
//! in the source, comments and strings included, rejects the script. The
//! one permitted import is masked out before scanning.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SandboxError;
use crate::types::SandboxConfig;

/// The only module a script may import.
pub const ALLOWED_MODULE: &str = "brickyard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    Environment,
    Filesystem,
    DynamicCode,
    ModuleLoading,
    ProcessSpawn,
    Network,
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreatCategory::Environment => "environment access",
            ThreatCategory::Filesystem => "filesystem access",
            ThreatCategory::DynamicCode => "dynamic code evaluation",
            ThreatCategory::ModuleLoading => "module loading",
            ThreatCategory::ProcessSpawn => "process spawning",
            ThreatCategory::Network => "network access",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub category: ThreatCategory,
    pub line: usize,
    pub snippet: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (`{}`)", self.line, self.category, self.snippet)
    }
}

const RULES: &[(ThreatCategory, &str)] = &[
    (ThreatCategory::Environment, r"\bprocess\b"),
    (ThreatCategory::Environment, r"\b(?:env|getenv|set_var|var_os)\b"),
    (ThreatCategory::Filesystem, r"\bfs\s*(?:\.|::)"),
    (ThreatCategory::Filesystem, r"\b(?:File|Path|Dir)\s*(?:\.|::|\()"),
    (ThreatCategory::Filesystem, r"\b(?:open_file|read_file|write_file|read_dir|remove_file|fopen)\b"),
    (ThreatCategory::DynamicCode, r"\beval\b"),
    (ThreatCategory::DynamicCode, r"\bFunction\s*\("),
    (ThreatCategory::DynamicCode, r"\b(?:compile|call_fn|run_script)\s*\("),
    (ThreatCategory::ModuleLoading, r"\brequire\s*\("),
    (ThreatCategory::ModuleLoading, r"\bimport\b"),
    (ThreatCategory::ProcessSpawn, r"\b(?:spawn|exec|exec_sync|system|popen)\s*\("),
    (ThreatCategory::ProcessSpawn, r"\b(?:child_process|Command)\b"),
    (ThreatCategory::Network, r"\b(?:fetch|XMLHttpRequest|WebSocket|TcpStream|UdpSocket)\b"),
    (ThreatCategory::Network, r"\b(?:socket|http|https|net)\s*(?:\.|::|\()"),
];

fn rules() -> &'static [(ThreatCategory, Regex)] {
    static RULES_COMPILED: OnceLock<Vec<(ThreatCategory, Regex)>> = OnceLock::new();
    RULES_COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|(category, pattern)| {
                (*category, Regex::new(pattern).expect("denylist pattern compiles"))
            })
            .collect()
    })
}

fn allowed_import() -> &'static Regex {
    static ALLOWED: OnceLock<Regex> = OnceLock::new();
    ALLOWED.get_or_init(|| {
        Regex::new(r#"\bimport\s+"brickyard"(?:\s+as\s+[A-Za-z_][A-Za-z0-9_]*)?"#)
            .expect("allowed import pattern compiles")
    })
}

/// Blank out the permitted import, keeping byte offsets and line breaks.
fn mask_allowed(source: &str) -> String {
    allowed_import()
        .replace_all(source, |caps: &regex::Captures<'_>| " ".repeat(caps[0].len()))
        .into_owned()
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Every denylist hit in `source`, in source order.
pub fn scan(source: &str) -> Vec<Violation> {
    let masked = mask_allowed(source);
    let mut violations: Vec<(usize, Violation)> = Vec::new();
    for (category, re) in rules() {
        for m in re.find_iter(&masked) {
            violations.push((
                m.start(),
                Violation {
                    category: *category,
                    line: line_of(&masked, m.start()),
                    snippet: m.as_str().trim().to_string(),
                },
            ));
        }
    }
    violations.sort_by_key(|(offset, _)| *offset);
    violations.into_iter().map(|(_, v)| v).collect()
}

/// Reject a script before any of it runs.
pub fn validate_source(
    source: &str,
    deadline_ms: u64,
    config: &SandboxConfig,
) -> Result<(), SandboxError> {
    if deadline_ms == 0 {
        return Err(SandboxError::Validation {
            message: "deadline must be greater than zero".into(),
            violations: Vec::new(),
        });
    }
    if source.len() > config.max_source_bytes {
        return Err(SandboxError::Validation {
            message: format!(
                "source is {} bytes, limit is {}",
                source.len(),
                config.max_source_bytes
            ),
            violations: Vec::new(),
        });
    }
    if source.trim().is_empty() {
        return Err(SandboxError::Validation {
            message: "source is empty".into(),
            violations: Vec::new(),
        });
    }

    let violations = scan(source);
    if violations.is_empty() {
        return Ok(());
    }
    let message = violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(SandboxError::Validation {
        message,
        violations,
    })
}
