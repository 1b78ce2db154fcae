use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use brick_types::{ColorCode, Element, Mat3, PartPlacement, PartRef, Vec3};

use crate::errors::FormatError;
use crate::metadata::DocumentHeader;
use crate::save::PLACEMENT_FIELDS;

/// A document read back with its header and step boundaries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub header: DocumentHeader,
    /// Placements and steps in document order. Leading and repeated steps are collapsed.
    pub elements: Vec<Element>,
    /// Placement-looking lines that were skipped.
    pub skipped: Vec<FormatError>,
}

impl ParsedDocument {
    pub fn placements(&self) -> impl Iterator<Item = &PartPlacement> {
        self.elements.iter().filter_map(Element::as_part)
    }
}

/// Classification of one document line.
enum Line {
    Placement(Result<PartPlacement, FormatError>),
    Step,
    Comment(String),
    Other,
}

fn classify(line_no: usize, line: &str) -> Line {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("1") => Line::Placement(parse_placement_line(line_no, line)),
        Some("0") => {
            let body = line.trim_start()[1..].trim();
            if body == "STEP" {
                Line::Step
            } else {
                Line::Comment(body.to_string())
            }
        }
        _ => Line::Other,
    }
}

fn parse_placement_line(line_no: usize, line: &str) -> Result<PartPlacement, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < PLACEMENT_FIELDS {
        return Err(FormatError::TooFewFields {
            line: line_no,
            found: tokens.len(),
            expected: PLACEMENT_FIELDS,
        });
    }

    let color = tokens[1]
        .parse::<u32>()
        .map_err(|_| FormatError::InvalidColor {
            line: line_no,
            value: tokens[1].to_string(),
        })?;

    let mut numbers = [0.0f64; 12];
    for (i, slot) in numbers.iter_mut().enumerate() {
        let field = i + 2;
        *slot = tokens[field]
            .parse::<f64>()
            .map_err(|_| FormatError::InvalidNumber {
                line: line_no,
                field: field + 1,
                value: tokens[field].to_string(),
            })?;
    }

    let mut entries = [0.0f64; 9];
    entries.copy_from_slice(&numbers[3..]);

    Ok(PartPlacement {
        color: ColorCode(color),
        position: Vec3::new(numbers[0], numbers[1], numbers[2]),
        orientation: Mat3::from_entries(entries),
        // File names may contain spaces.
        part: PartRef::from_file_name(tokens[PLACEMENT_FIELDS - 1..].join(" ")),
    })
}

fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().map(|(i, l)| (i + 1, l))
}

/// Lenient parse: every well-formed placement line, in order.
///
/// Comments, headers, blank lines, unknown directives and malformed
/// placement lines are skipped.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_placements(text: &str) -> Vec<PartPlacement> {
    let mut placements = Vec::new();
    for (line_no, line) in numbered_lines(text) {
        if let Line::Placement(result) = classify(line_no, line) {
            match result {
                Ok(p) => placements.push(p),
                Err(e) => debug!(error = %e, "skipping malformed placement"),
            }
        }
    }
    placements
}

/// Strict parse: a malformed placement line is an error.
pub fn parse_placements_strict(text: &str) -> Result<Vec<PartPlacement>, FormatError> {
    numbered_lines(text)
        .filter_map(|(line_no, line)| match classify(line_no, line) {
            Line::Placement(result) => Some(result),
            _ => None,
        })
        .collect()
}

/// Parse header fields, placements and step boundaries.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_document(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    let mut in_header = true;

    for (line_no, line) in numbered_lines(text) {
        match classify(line_no, line) {
            Line::Placement(Ok(p)) => {
                in_header = false;
                doc.elements.push(Element::Part(p));
            }
            Line::Placement(Err(e)) => {
                debug!(error = %e, "skipping malformed placement");
                doc.skipped.push(e);
            }
            // Only a placement ends the header; a stray step does not.
            Line::Step => {
                if matches!(doc.elements.last(), Some(Element::Part(_))) {
                    doc.elements.push(Element::Step);
                }
            }
            Line::Comment(body) => {
                if in_header {
                    doc.header.absorb(&body);
                }
            }
            Line::Other => {}
        }
    }
    doc
}
