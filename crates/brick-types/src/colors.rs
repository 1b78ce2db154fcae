use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Palette index into the color table. Non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorCode(pub u32);

impl ColorCode {
    pub const BLACK: Self = Self(0);
    pub const RED: Self = Self(4);
    /// LDraw "main colour": inherit from the referencing file.
    pub const MAIN: Self = Self(16);

    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for ColorCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One palette slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub code: ColorCode,
    pub name: String,
    /// Display color as 0xRRGGBB.
    pub rgb: u32,
    pub translucent: bool,
}

impl ColorEntry {
    /// `#RRGGBB` form used by renderers.
    pub fn hex(&self) -> String {
        format!("#{:06X}", self.rgb)
    }
}

const STANDARD_COLORS: &[(u32, &str, u32, bool)] = &[
    (0, "Black", 0x05131D, false),
    (1, "Blue", 0x0055BF, false),
    (2, "Green", 0x257A3E, false),
    (3, "Dark_Turquoise", 0x00838F, false),
    (4, "Red", 0xC91A09, false),
    (5, "Dark_Pink", 0xC870A0, false),
    (6, "Brown", 0x583927, false),
    (7, "Light_Grey", 0x9BA19D, false),
    (8, "Dark_Grey", 0x6D6E5C, false),
    (9, "Light_Blue", 0xB4D2E3, false),
    (10, "Bright_Green", 0x4B9F4A, false),
    (11, "Light_Turquoise", 0x55A5AF, false),
    (12, "Salmon", 0xF2705E, false),
    (13, "Pink", 0xFC97AC, false),
    (14, "Yellow", 0xF2CD37, false),
    (15, "White", 0xFFFFFF, false),
    (16, "Main_Colour", 0x7F7F7F, false),
    (17, "Light_Green", 0xC2DAB8, false),
    (18, "Light_Yellow", 0xFBE696, false),
    (19, "Tan", 0xE4CD9E, false),
    (20, "Light_Violet", 0xC9CAE2, false),
    (36, "Trans_Red", 0xC91A09, true),
    (43, "Trans_Light_Blue", 0xAEE9EF, true),
    (47, "Trans_Clear", 0xFCFCFC, true),
];

/// Immutable palette shared by every execution and codec consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTable {
    entries: Vec<ColorEntry>,
}

impl ColorTable {
    /// The process-wide standard palette, built on first use.
    pub fn standard() -> &'static ColorTable {
        static TABLE: OnceLock<ColorTable> = OnceLock::new();
        TABLE.get_or_init(|| ColorTable {
            entries: STANDARD_COLORS
                .iter()
                .map(|&(code, name, rgb, translucent)| ColorEntry {
                    code: ColorCode(code),
                    name: name.to_string(),
                    rgb,
                    translucent,
                })
                .collect(),
        })
    }

    pub fn get(&self, code: ColorCode) -> Option<&ColorEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    /// Case-insensitive lookup; spaces and underscores are interchangeable.
    pub fn by_name(&self, name: &str) -> Option<&ColorEntry> {
        let wanted = normalize_name(name);
        self.entries
            .iter()
            .find(|e| normalize_name(&e.name) == wanted)
    }

    pub fn contains(&self, code: ColorCode) -> bool {
        self.get(code).is_some()
    }

    pub fn is_translucent(&self, code: ColorCode) -> bool {
        self.get(code).map(|e| e.translucent).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}
