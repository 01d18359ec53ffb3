use serde::{Deserialize, Serialize};

/// Advance width of a monospace glyph relative to the font size.
pub const GLYPH_ASPECT: f64 = 0.6;

/// Font settings that determine the on-screen size of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub family: String,
    /// Pixel size.
    pub size: f64,
    pub character_spacing: f64,
    pub line_spacing: f64,
}

impl Font {
    pub fn cell_width(&self) -> f64 {
        self.size * GLYPH_ASPECT * self.character_spacing
    }

    pub fn cell_height(&self) -> f64 {
        self.size * self.line_spacing
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Courier New".into(),
            size: 20.0,
            character_spacing: 1.0,
            line_spacing: 1.0,
        }
    }
}
