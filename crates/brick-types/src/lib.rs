pub mod colors;
pub mod error_kind;
pub mod geometry;
pub mod model;

pub use colors::*;
pub use error_kind::*;
pub use geometry::*;
pub use model::*;
