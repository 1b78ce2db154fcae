//! Line-oriented part-placement documents (the LDraw `.ldr` subset).
//!
//! [`serialize_model`] writes a [`Model`](brick_types::Model) as text;
//! [`parse_placements`] and friends read placements back. The canonical
//! parsers never change coordinates; [`render`] holds the consumer-side
//! conversion into renderer space.

pub mod errors;
pub mod load;
pub mod metadata;
pub mod render;
pub mod save;

pub use errors::FormatError;
pub use load::{parse_document, parse_placements, parse_placements_strict, ParsedDocument};
pub use metadata::{document_file_name, DocumentHeader, LICENSE, TITLE_GUARD};
pub use render::{parse_for_render, to_render_space, RenderPlacement};
pub use save::{serialize_model, PLACEMENT_FIELDS, STEP_LINE};
