//! Conversion from document space into renderer space.
//!
//! Documents use -Y as "up"; renderers use +Y. The flip happens here, on the
//! consumer side, and never in the canonical parse.

use serde::{Deserialize, Serialize};

use brick_types::{ColorCode, ColorTable, PartPlacement, PartRef};

use crate::load::parse_placements;

/// Fallback display color for codes missing from the table.
const UNKNOWN_RGB: u32 = 0x7F7F7F;

/// A placement ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlacement {
    pub part: PartRef,
    pub color: ColorCode,
    pub rgb: u32,
    pub translucent: bool,
    /// Position with the second coordinate negated.
    pub position: [f64; 3],
    /// Row-major orientation entries, unchanged.
    pub orientation: [f64; 9],
}

pub fn to_render_space(p: &PartPlacement, colors: &ColorTable) -> RenderPlacement {
    let entry = colors.get(p.color);
    RenderPlacement {
        part: p.part.clone(),
        color: p.color,
        rgb: entry.map(|e| e.rgb).unwrap_or(UNKNOWN_RGB),
        translucent: entry.map(|e| e.translucent).unwrap_or(false),
        position: [p.position.x, -p.position.y, p.position.z],
        orientation: p.orientation.entries(),
    }
}

/// Lenient parse followed by the render-space conversion.
pub fn parse_for_render(text: &str, colors: &ColorTable) -> Vec<RenderPlacement> {
    parse_placements(text)
        .iter()
        .map(|p| to_render_space(p, colors))
        .collect()
}
