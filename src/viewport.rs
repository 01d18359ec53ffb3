use serde::{Deserialize, Serialize};

use crate::content::Pos;
use crate::font::Font;
use crate::helpers::in_range;

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Snapshot of the canvas placement used to convert pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Top-left corner of the canvas element.
    pub canvas_origin: Pixel,
    pub pan: Pixel,
    pub cell_width: f64,
    pub cell_height: f64,
    pub zoom: f64,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl Viewport {
    /// Viewport at the origin with no pan, cells sized from `font`.
    pub fn for_font(font: &Font, zoom: f64, grid_width: usize, grid_height: usize) -> Self {
        Self {
            canvas_origin: Pixel::default(),
            pan: Pixel::default(),
            cell_width: font.cell_width(),
            cell_height: font.cell_height(),
            zoom,
            grid_width,
            grid_height,
        }
    }

    fn scaled(&self) -> (f64, f64) {
        (self.cell_width * self.zoom, self.cell_height * self.zoom)
    }

    // Fractional cell coordinates, not clamped.
    fn cells(&self, mouse: Pixel) -> (f64, f64) {
        let (w, h) = self.scaled();
        (
            (mouse.x - self.canvas_origin.x - self.pan.x) / w,
            (mouse.y - self.canvas_origin.y - self.pan.y) / h,
        )
    }

    /// Cell under the pointer, clamped into the grid.
    pub fn pixel_to_grid(&self, mouse: Pixel) -> Pos {
        let (x, y) = self.cells(mouse);
        Pos::new(
            in_range(x.floor() as i64, self.grid_width) as i32,
            in_range(y.floor() as i64, self.grid_height) as i32,
        )
    }

    /// Center of the cell under the pointer, for anchor rendering.
    pub fn pixel_to_grid_center(&self, mouse: Pixel) -> (f64, f64) {
        let pos = self.pixel_to_grid(mouse);
        (pos.x as f64 + 0.5, pos.y as f64 + 0.5)
    }

    /// Top-left pixel of a cell.
    pub fn grid_to_pixel(&self, pos: Pos) -> Pixel {
        let (w, h) = self.scaled();
        Pixel::new(
            self.canvas_origin.x + self.pan.x + pos.x as f64 * w,
            self.canvas_origin.y + self.pan.y + pos.y as f64 * h,
        )
    }

    /// Pixel of a fractional grid coordinate such as a cell center.
    pub fn grid_point_to_pixel(&self, x: f64, y: f64) -> Pixel {
        let (w, h) = self.scaled();
        Pixel::new(
            self.canvas_origin.x + self.pan.x + x * w,
            self.canvas_origin.y + self.pan.y + y * h,
        )
    }
}
