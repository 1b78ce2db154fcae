//! Fluent construction of part-placement models.
//!
//! ```
//! use model_builder::Builder;
//!
//! let mut b = Builder::new("Small Red Car", "brickyard");
//! b.set_active_color(4)
//!     .brick("3001", 0.0, -24.0, 0.0)
//!     .step()
//!     .wheel("3641", 30.0, 0.0, 20.0);
//! assert!(b.to_document().contains("3001.dat"));
//! ```

use tracing::trace;

use brick_types::{ColorCode, Element, ElementKind, Frame, Mat3, Model, PartPlacement, PartRef, Vec3};

/// Mutable scene under construction.
///
/// Every mutator returns `&mut Self` so calls chain. Nothing here validates:
/// odd input is accepted and shows up in [`Model::check`] or in the codec.
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    model: Model,
    active_color: ColorCode,
}

impl Builder {
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            model: Model::new(name, author),
            active_color: ColorCode::MAIN,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.model.name = name.into();
        self
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.model.author = author.into();
        self
    }

    /// Default color for [`Builder::brick`] and [`Builder::plate`].
    /// Existing elements keep their colors.
    pub fn set_active_color(&mut self, code: impl Into<ColorCode>) -> &mut Self {
        self.active_color = code.into();
        self
    }

    pub fn active_color(&self) -> ColorCode {
        self.active_color
    }

    /// Append a placement with identity orientation.
    pub fn place_part(
        &mut self,
        part: impl Into<PartRef>,
        color: impl Into<ColorCode>,
        x: f64,
        y: f64,
        z: f64,
    ) -> &mut Self {
        self.place_part_oriented(part, color, Vec3::new(x, y, z), Mat3::IDENTITY)
    }

    /// Append a placement with an explicit orientation. Any matrix is accepted.
    pub fn place_part_oriented(
        &mut self,
        part: impl Into<PartRef>,
        color: impl Into<ColorCode>,
        position: Vec3,
        orientation: Mat3,
    ) -> &mut Self {
        let placement = PartPlacement {
            color: color.into(),
            position,
            orientation,
            part: part.into(),
        };
        trace!(part = %placement.part, color = %placement.color, "place part");
        self.model.elements.push(Element::Part(placement));
        self
    }

    /// Place a part given in `frame`'s local coordinates.
    pub fn place_in_frame(
        &mut self,
        frame: &Frame,
        part: impl Into<PartRef>,
        color: impl Into<ColorCode>,
        local: &Frame,
    ) -> &mut Self {
        let world = frame.compose(local);
        self.place_part_oriented(part, color, world.position, world.orientation)
    }

    pub fn brick(&mut self, part: impl Into<PartRef>, x: f64, y: f64, z: f64) -> &mut Self {
        let color = self.active_color;
        self.place_part(part, color, x, y, z)
    }

    pub fn plate(&mut self, part: impl Into<PartRef>, x: f64, y: f64, z: f64) -> &mut Self {
        let color = self.active_color;
        self.place_part(part, color, x, y, z)
    }

    /// Wheels are always color 0: tires render in the black slot.
    pub fn wheel(&mut self, part: impl Into<PartRef>, x: f64, y: f64, z: f64) -> &mut Self {
        self.place_part(part, ColorCode::BLACK, x, y, z)
    }

    /// Place a part turned a quarter turn about Y.
    pub fn place_part_rotated_y(
        &mut self,
        part: impl Into<PartRef>,
        color: impl Into<ColorCode>,
        x: f64,
        y: f64,
        z: f64,
    ) -> &mut Self {
        self.place_part_oriented(part, color, Vec3::new(x, y, z), Mat3::ROT_Y_90)
    }

    /// Place a part turned a quarter turn about X.
    pub fn place_part_rotated_x(
        &mut self,
        part: impl Into<PartRef>,
        color: impl Into<ColorCode>,
        x: f64,
        y: f64,
        z: f64,
    ) -> &mut Self {
        self.place_part_oriented(part, color, Vec3::new(x, y, z), Mat3::ROT_X_90)
    }

    /// Close the current build step.
    ///
    /// No-op on an empty model or right after another step.
    pub fn step(&mut self) -> &mut Self {
        match self.model.elements.last() {
            None | Some(Element::Step) => {}
            Some(Element::Part(_)) => self.model.elements.push(Element::Step),
        }
        self
    }

    /// Drop all elements. Name, author and active color are kept.
    pub fn clear(&mut self) -> &mut Self {
        self.model.elements.clear();
        self
    }

    pub fn element_count(&self, kind: ElementKind) -> usize {
        self.model.count(kind)
    }

    /// Serialize the current state without changing it.
    pub fn to_document(&self) -> String {
        file_format::serialize_model(&self.model)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new("Untitled", "")
    }
}
