use std::fmt::Write as _;

use brick_types::{Element, Model, PartPlacement};

use crate::metadata::{document_file_name, guard_title, single_line, BFC_CERTIFY, LICENSE};

/// Minimum whitespace-separated tokens on a placement line:
/// type, color, x y z, nine orientation entries, part reference.
pub const PLACEMENT_FIELDS: usize = 15;

/// The step directive, alone on its line.
pub const STEP_LINE: &str = "0 STEP";

/// Serialize a model to document text.
///
/// The output always ends with a step directive, adjacent or leading steps
/// are collapsed, and the same model always produces the same text.
pub fn serialize_model(model: &Model) -> String {
    let mut out = String::new();
    write_header(&mut out, model);

    // True when the last thing written was a step (or nothing yet).
    let mut at_step_boundary = true;
    for element in &model.elements {
        match element {
            Element::Part(placement) => {
                write_placement(&mut out, placement);
                at_step_boundary = false;
            }
            Element::Step => {
                if !at_step_boundary {
                    write_step(&mut out);
                    at_step_boundary = true;
                }
            }
        }
    }

    // An empty model still gets its single step.
    if !at_step_boundary || model.placements().next().is_none() {
        write_step(&mut out);
    }
    out
}

fn write_header(out: &mut String, model: &Model) {
    let name = single_line(model.name.trim());
    let title = if name.is_empty() { "Untitled" } else { name.as_str() };
    let _ = writeln!(out, "0 {}", guard_title(title));
    let _ = writeln!(out, "0 Name: {}", document_file_name(title));
    let _ = writeln!(out, "0 Author: {}", single_line(model.author.trim()));
    let _ = writeln!(out, "0 !LICENSE {LICENSE}");
    let _ = writeln!(out, "0 BFC {BFC_CERTIFY}");
    out.push('\n');
}

fn write_placement(out: &mut String, p: &PartPlacement) {
    let _ = write!(
        out,
        "1 {} {} {} {}",
        p.color, p.position.x, p.position.y, p.position.z
    );
    for entry in p.orientation.entries() {
        let _ = write!(out, " {entry}");
    }
    let _ = writeln!(out, " {}", p.part);
}

fn write_step(out: &mut String) {
    out.push_str(STEP_LINE);
    out.push_str("\n\n");
}
