use serde::{Deserialize, Serialize};
use std::fmt;

use crate::colors::ColorCode;
use crate::geometry::{Mat3, Vec3};

/// Extensions that mark an identifier as already naming a file.
const PART_EXTENSIONS: &[&str] = &[".dat", ".ldr", ".mpd"];

/// A part-file identifier such as `3001.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartRef(String);

impl PartRef {
    /// Normalize a part number to a file reference: `"3001"` becomes `"3001.dat"`.
    /// Identifiers that already carry a part-file extension are kept as-is.
    /// Runs of whitespace become one space, since documents separate fields
    /// by whitespace and could not give them back.
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if id.is_empty() {
            return Self(String::new());
        }
        let lower = id.to_ascii_lowercase();
        if PART_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Self(id.to_string())
        } else {
            Self(format!("{id}.dat"))
        }
    }

    /// Wrap a reference read from a document without normalizing it.
    pub fn from_file_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PartRef {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// One instance of a named part at a position and orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartPlacement {
    pub color: ColorCode,
    pub position: Vec3,
    pub orientation: Mat3,
    pub part: PartRef,
}

impl PartPlacement {
    pub fn new(part: impl Into<PartRef>, color: ColorCode, position: Vec3) -> Self {
        Self {
            color,
            position,
            orientation: Mat3::IDENTITY,
            part: part.into(),
        }
    }

    pub fn with_orientation(mut self, orientation: Mat3) -> Self {
        self.orientation = orientation;
        self
    }
}

/// An entry in a model's ordered element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    Part(PartPlacement),
    Step,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Part(_) => ElementKind::Part,
            Element::Step => ElementKind::Step,
        }
    }

    pub fn as_part(&self) -> Option<&PartPlacement> {
        match self {
            Element::Part(p) => Some(p),
            Element::Step => None,
        }
    }
}

/// Tag of an [`Element`], used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Part,
    Step,
}

/// The root aggregate: metadata plus ordered elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub author: String,
    pub elements: Vec<Element>,
}

impl Model {
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            elements: Vec::new(),
        }
    }

    pub fn placements(&self) -> impl Iterator<Item = &PartPlacement> {
        self.elements.iter().filter_map(Element::as_part)
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Report invariant violations without rejecting the model.
    pub fn check(&self) -> Vec<ModelIssue> {
        let mut issues = Vec::new();
        let mut previous_step = false;
        for (index, element) in self.elements.iter().enumerate() {
            match element {
                Element::Part(p) => {
                    previous_step = false;
                    if p.part.is_empty() {
                        issues.push(ModelIssue::EmptyPartRef { index });
                    }
                    if !p.position.is_finite() {
                        issues.push(ModelIssue::NonFinitePosition { index });
                    }
                    if !p.orientation.is_invertible() {
                        issues.push(ModelIssue::SingularOrientation { index });
                    }
                }
                Element::Step => {
                    if index == 0 || previous_step {
                        issues.push(ModelIssue::MisplacedStep { index });
                    }
                    previous_step = true;
                }
            }
        }
        issues
    }
}

/// An invariant violation found by [`Model::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelIssue {
    EmptyPartRef { index: usize },
    NonFinitePosition { index: usize },
    SingularOrientation { index: usize },
    /// A leading step or two adjacent steps.
    MisplacedStep { index: usize },
}

impl fmt::Display for ModelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIssue::EmptyPartRef { index } => write!(f, "element {index}: empty part reference"),
            ModelIssue::NonFinitePosition { index } => {
                write!(f, "element {index}: non-finite position")
            }
            ModelIssue::SingularOrientation { index } => {
                write!(f, "element {index}: orientation is not invertible")
            }
            ModelIssue::MisplacedStep { index } => write!(f, "element {index}: misplaced step"),
        }
    }
}
