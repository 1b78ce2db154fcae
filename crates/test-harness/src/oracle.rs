//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so one pass can collect every failure.

use brick_types::{ColorCode, Element, Model, PartPlacement};
use file_format::{parse_document, parse_placements_strict, serialize_model, STEP_LINE};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }
}

// ── Document Oracles ────────────────────────────────────────────────────────

/// The last non-blank line is a step directive.
pub fn check_trailing_step(text: &str) -> OracleVerdict {
    match text.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) if line.trim() == STEP_LINE => {
            OracleVerdict::pass("trailing_step", "document ends with a step".into())
        }
        Some(line) => OracleVerdict::fail("trailing_step", format!("last line is {line:?}")),
        None => OracleVerdict::fail("trailing_step", "document is empty".into()),
    }
}

/// No leading step and no two steps in a row.
pub fn check_step_spacing(text: &str) -> OracleVerdict {
    let doc = parse_document(text);
    let raw_steps = text.lines().filter(|l| l.trim() == STEP_LINE).count();
    let kept_steps = doc.elements.iter().filter(|e| **e == Element::Step).count();
    if raw_steps == kept_steps {
        OracleVerdict::pass("step_spacing", format!("{raw_steps} steps, none redundant"))
    } else {
        OracleVerdict::fail(
            "step_spacing",
            format!("{raw_steps} step lines but only {kept_steps} separate parts"),
        )
    }
}

/// Every line that looks like a placement parses strictly.
pub fn check_strict_parse(text: &str) -> OracleVerdict {
    match parse_placements_strict(text) {
        Ok(p) => OracleVerdict::pass("strict_parse", format!("{} placements", p.len())),
        Err(e) => OracleVerdict::fail("strict_parse", e.to_string()),
    }
}

/// Parsing the serialized model gives back its placements field for field.
pub fn check_round_trip(model: &Model) -> OracleVerdict {
    let expected: Vec<&PartPlacement> = model.placements().collect();
    let text = serialize_model(model);
    let parsed = match parse_placements_strict(&text) {
        Ok(p) => p,
        Err(e) => return OracleVerdict::fail("round_trip", e.to_string()),
    };
    if parsed.len() != expected.len() {
        return OracleVerdict::fail(
            "round_trip",
            format!("expected {} placements, parsed {}", expected.len(), parsed.len()),
        );
    }
    for (i, (got, want)) in parsed.iter().zip(expected).enumerate() {
        if got != want {
            return OracleVerdict::fail(
                "round_trip",
                format!("placement {i}: expected {want:?}, got {got:?}"),
            );
        }
    }
    OracleVerdict::pass("round_trip", format!("{} placements match", parsed.len()))
}

/// Serializing twice gives the same text.
pub fn check_idempotent(model: &Model) -> OracleVerdict {
    if serialize_model(model) == serialize_model(model) {
        OracleVerdict::pass("idempotent", "identical output".into())
    } else {
        OracleVerdict::fail("idempotent", "two serializations differ".into())
    }
}

/// Every placement of `part` uses `color`.
pub fn check_part_color(text: &str, part: &str, color: ColorCode) -> OracleVerdict {
    let doc = parse_document(text);
    let wrong: Vec<usize> = doc
        .placements()
        .enumerate()
        .filter(|(_, p)| p.part.as_str() == part && p.color != color)
        .map(|(i, _)| i)
        .collect();
    if wrong.is_empty() {
        OracleVerdict::pass("part_color", format!("all {part} use color {color}"))
    } else {
        OracleVerdict::fail(
            "part_color",
            format!("{part} placements {wrong:?} are not color {color}"),
        )
    }
}

/// Run every document oracle over `text`.
pub fn run_document_checks(text: &str) -> Vec<OracleVerdict> {
    vec![
        check_trailing_step(text),
        check_step_spacing(text),
        check_strict_parse(text),
        check_part_color(text, "3641.dat", ColorCode::BLACK),
    ]
}

/// Run every model oracle, then the document oracles on its serialization.
pub fn run_model_checks(model: &Model) -> Vec<OracleVerdict> {
    let mut verdicts = vec![check_round_trip(model), check_idempotent(model)];
    verdicts.extend(run_document_checks(&serialize_model(model)));
    verdicts
}
