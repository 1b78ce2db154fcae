//! Plain-text summaries of a parsed document.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use brick_types::{ColorTable, Element};
use file_format::parse_document;

use crate::oracle::OracleVerdict;

/// What a document contains, for logs and failure messages.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub title: Option<String>,
    pub author: Option<String>,
    pub placement_count: usize,
    pub step_count: usize,
    /// Placements per color code, ascending.
    pub colors: BTreeMap<u32, usize>,
    /// Placements per part reference, ascending.
    pub parts: BTreeMap<String, usize>,
    pub bounding_box: Option<([f64; 3], [f64; 3])>,
    pub skipped_lines: usize,
    #[serde(skip)]
    pub oracle_results: Vec<OracleVerdict>,
}

impl DocumentReport {
    pub fn from_document(text: &str) -> Self {
        let doc = parse_document(text);
        let mut colors = BTreeMap::new();
        let mut parts = BTreeMap::new();
        let mut bounding_box: Option<([f64; 3], [f64; 3])> = None;

        for p in doc.placements() {
            *colors.entry(p.color.value()).or_insert(0) += 1;
            *parts.entry(p.part.as_str().to_string()).or_insert(0) += 1;
            let at = p.position.to_array();
            if at.iter().all(|v| v.is_finite()) {
                let (min, max) = bounding_box.get_or_insert((at, at));
                for i in 0..3 {
                    min[i] = min[i].min(at[i]);
                    max[i] = max[i].max(at[i]);
                }
            }
        }

        Self {
            title: doc.header.title.clone(),
            author: doc.header.author.clone(),
            placement_count: doc.placements().count(),
            step_count: doc.elements.iter().filter(|e| **e == Element::Step).count(),
            colors,
            parts,
            bounding_box,
            skipped_lines: doc.skipped.len(),
            oracle_results: Vec::new(),
        }
    }

    pub fn with_oracles(mut self, verdicts: Vec<OracleVerdict>) -> Self {
        self.oracle_results = verdicts;
        self
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Brickyard Document Report ===\n\n");
        out.push_str(&format!(
            "Title: {}\nAuthor: {}\n",
            self.title.as_deref().unwrap_or("(none)"),
            self.author.as_deref().unwrap_or("(none)"),
        ));
        out.push_str(&format!(
            "Placements: {} in {} steps ({} unreadable lines)\n",
            self.placement_count, self.step_count, self.skipped_lines,
        ));

        if !self.parts.is_empty() {
            out.push_str("\nParts:\n");
            for (part, n) in &self.parts {
                out.push_str(&format!("  {part}: {n}\n"));
            }
        }

        if !self.colors.is_empty() {
            let table = ColorTable::standard();
            out.push_str("\nColors:\n");
            for (code, n) in &self.colors {
                let name = table
                    .get((*code).into())
                    .map(|e| e.name.as_str())
                    .unwrap_or("unknown");
                out.push_str(&format!("  {code} ({name}): {n}\n"));
            }
        }

        if let Some((min, max)) = self.bounding_box {
            out.push_str(&format!(
                "\nBounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                min[0], min[1], min[2], max[0], max[1], max[2],
            ));
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        out
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
