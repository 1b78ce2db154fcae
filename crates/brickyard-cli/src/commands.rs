use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use brick_types::{ColorTable, Element, Model};
use file_format::{parse_document, parse_placements_strict};
use load_coordinator::{DocumentRef, DocumentStore, FileStore};
use script_sandbox::{ExecutionOutput, Sandbox};

use crate::config::AppConfig;

/// Read a script or document without blocking the runtime.
pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Write a produced document to `path`.
pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Execute a script with the configured sandbox limits.
pub fn run_script(
    config: &AppConfig,
    source: &str,
    deadline_ms: Option<u64>,
) -> Result<ExecutionOutput> {
    let sandbox = Sandbox::new(config.sandbox.clone());
    let deadline = config.deadline_ms(deadline_ms);
    sandbox.execute(source, deadline).map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(format!("script failed ({kind})"))
    })
}

/// Write `document` into the configured store directory.
pub async fn save_document(config: &AppConfig, file_name: &str, document: &str) -> Result<DocumentRef> {
    let store = FileStore::new(config.store_dir());
    let reference = store
        .write(file_name, document)
        .await
        .with_context(|| format!("failed to save into {}", store.root().display()))?;
    Ok(reference)
}

/// Describe a document, as text or as JSON.
pub fn inspect(text: &str, json: bool, strict: bool, out: &mut dyn Write) -> Result<()> {
    if strict {
        parse_placements_strict(text).context("strict parse failed")?;
    }
    let doc = parse_document(text);

    if json {
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    let steps = doc.elements.iter().filter(|e| **e == Element::Step).count();
    writeln!(out, "title:      {}", doc.header.title.as_deref().unwrap_or("-"))?;
    writeln!(out, "file name:  {}", doc.header.file_name.as_deref().unwrap_or("-"))?;
    writeln!(out, "author:     {}", doc.header.author.as_deref().unwrap_or("-"))?;
    writeln!(out, "placements: {}", doc.placements().count())?;
    writeln!(out, "steps:      {steps}")?;
    for err in &doc.skipped {
        writeln!(out, "skipped:    {err}")?;
    }

    let issues = Model {
        elements: doc.elements.clone(),
        ..Model::default()
    }
    .check();
    for issue in issues {
        writeln!(out, "issue:      {issue}")?;
    }
    Ok(())
}

/// Print the color table.
pub fn colors(out: &mut dyn Write) -> Result<()> {
    for entry in ColorTable::standard().iter() {
        let flag = if entry.translucent { " (translucent)" } else { "" };
        writeln!(
            out,
            "{:>3}  #{}  {}{}",
            entry.code.value(),
            entry.hex(),
            entry.name,
            flag
        )?;
    }
    Ok(())
}
