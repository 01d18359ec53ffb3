use serde::{Deserialize, Serialize};

use crate::colors::{hsl_to_rgb, rgb_to_hsl, Color, Hsl, Rgb};
use crate::content::Grid;
use crate::error::{Error, Result};
use crate::helpers::channel;

/// Which cell colors a tone effect may touch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "colors", rename_all = "snake_case")]
pub enum ColorRange {
    #[default]
    All,
    /// Only colors whose text is exactly one of these.
    Custom(Vec<String>),
}

impl ColorRange {
    pub fn includes(&self, color: &Color) -> bool {
        match self {
            ColorRange::All => true,
            ColorRange::Custom(list) => list.iter().any(|c| c == color.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelsSettings {
    pub shadows_input: u8,
    /// Midtone gamma, `0.1..=3.0`.
    pub midtones_input: f64,
    pub highlights_input: u8,
    pub output_min: u8,
    pub output_max: u8,
    pub color_range: ColorRange,
}

impl Default for LevelsSettings {
    fn default() -> Self {
        Self {
            shadows_input: 0,
            midtones_input: 1.0,
            highlights_input: 255,
            output_min: 0,
            output_max: 255,
            color_range: ColorRange::All,
        }
    }
}

impl LevelsSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=3.0).contains(&self.midtones_input) {
            return Err(Error::invalid_setting("midtonesInput", self.midtones_input));
        }
        Ok(())
    }

    /// Maps one 8-bit channel through the levels curve.
    ///
    /// A range with `highlights <= shadows` passes the channel through.
    pub fn channel(&self, v: u8) -> u8 {
        let shadows = self.shadows_input as f64;
        let highlights = self.highlights_input as f64;
        if highlights <= shadows {
            return v;
        }
        let out_min = self.output_min as f64;
        let out_max = self.output_max as f64;

        let clamped = (v as f64).clamp(shadows, highlights);
        let normalized = (clamped - shadows) / (highlights - shadows);
        let curved = normalized.powf(1.0 / self.midtones_input);
        channel(out_min + curved * (out_max - out_min))
    }

    pub fn rgb(&self, rgb: Rgb) -> Rgb {
        rgb.map(|c| self.channel(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HueSaturationSettings {
    /// Degrees, `-180..=180`.
    pub hue: i32,
    /// Percent, `-100..=100`.
    pub saturation: i32,
    /// Percent, `-100..=100`.
    pub lightness: i32,
    pub color_range: ColorRange,
}

impl HueSaturationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(-180..=180).contains(&self.hue) {
            return Err(Error::invalid_setting("hue", self.hue));
        }
        if !(-100..=100).contains(&self.saturation) {
            return Err(Error::invalid_setting("saturation", self.saturation));
        }
        if !(-100..=100).contains(&self.lightness) {
            return Err(Error::invalid_setting("lightness", self.lightness));
        }
        Ok(())
    }

    pub fn hsl(&self, hsl: Hsl) -> Hsl {
        Hsl {
            h: (hsl.h as i32 + self.hue).rem_euclid(360) as u16,
            s: (hsl.s as i32 + self.saturation).clamp(0, 100) as u8,
            l: (hsl.l as i32 + self.lightness).clamp(0, 100) as u8,
        }
    }

    pub fn rgb(&self, rgb: Rgb) -> Rgb {
        hsl_to_rgb(self.hsl(rgb_to_hsl(rgb)))
    }
}

/// Rewrites every eligible color of the grid through `f`.
///
/// Transparent and unparsable colors, and colors outside `range`, are left
/// alone. A color is only replaced when its RGB value changes. Returns the new
/// grid and the number of cells with at least one replaced color.
pub(crate) fn recolor<F>(grid: &Grid, range: &ColorRange, f: F) -> (Grid, usize)
where
    F: Fn(Rgb) -> Rgb,
{
    let shift = |color: &Color| -> Option<Color> {
        if !range.includes(color) {
            return None;
        }
        let old = color.rgb()?;
        let new = f(old);
        (new != old).then(|| Color::from_rgb(new))
    };

    let mut out = grid.clone();
    let mut affected = 0;
    for (pos, cell) in out.cells.iter_mut() {
        let fg = shift(&cell.foreground);
        let bg = shift(&cell.background);
        if fg.is_none() && bg.is_none() {
            continue;
        }
        tracing::trace!(%pos, "recolor");
        if let Some(fg) = fg {
            cell.foreground = fg;
        }
        if let Some(bg) = bg {
            cell.background = bg;
        }
        affected += 1;
    }
    (out, affected)
}

pub fn levels(grid: &Grid, settings: &LevelsSettings) -> (Grid, usize) {
    recolor(grid, &settings.color_range, |rgb| settings.rgb(rgb))
}

pub fn hue_saturation(grid: &Grid, settings: &HueSaturationSettings) -> (Grid, usize) {
    recolor(grid, &settings.color_range, |rgb| settings.rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::Char;
    use crate::content::{Cell, Pos};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn levels_of(shadows: u8, midtones: f64, highlights: u8, min: u8, max: u8) -> LevelsSettings {
        LevelsSettings {
            shadows_input: shadows,
            midtones_input: midtones,
            highlights_input: highlights,
            output_min: min,
            output_max: max,
            color_range: ColorRange::All,
        }
    }

    fn cell(fg: &str, bg: &str) -> Cell {
        Cell::new(Char::new('#').unwrap(), fg.into(), bg.into())
    }

    #[test]
    fn levels_clip_and_stretch() {
        let s = levels_of(50, 1.0, 200, 0, 255);
        assert_eq!(s.channel(50), 0);
        assert_eq!(s.channel(10), 0);
        assert_eq!(s.channel(200), 255);
        assert_eq!(s.channel(240), 255);
        assert!((127..=128).contains(&s.channel(125)));
    }

    #[test]
    fn levels_gamma_lifts_midtones() {
        let s = levels_of(0, 2.0, 255, 0, 255);
        assert!(s.channel(64) > 64);
        assert_eq!(s.channel(0), 0);
        assert_eq!(s.channel(255), 255);
    }

    #[test]
    fn levels_degenerate_range_passes_through() {
        let s = levels_of(200, 1.0, 100, 30, 60);
        for v in [0u8, 99, 150, 255] {
            assert_eq!(s.channel(v), v);
        }
        let s = levels_of(128, 1.0, 128, 30, 60);
        assert_eq!(s.channel(7), 7);
    }

    #[test]
    fn levels_validate_midtones() {
        assert!(levels_of(0, 0.05, 255, 0, 255).validate().is_err());
        assert!(levels_of(0, 3.0, 255, 0, 255).validate().is_ok());
    }

    #[test]
    fn hue_wraps_and_channels_clamp() {
        let s = HueSaturationSettings {
            hue: -30,
            saturation: 50,
            lightness: -80,
            color_range: ColorRange::All,
        };
        assert_eq!(s.hsl(Hsl { h: 10, s: 70, l: 50 }), Hsl { h: 340, s: 100, l: 0 });
        let s = HueSaturationSettings {
            hue: 180,
            ..Default::default()
        };
        assert_eq!(s.hsl(Hsl { h: 300, s: 10, l: 10 }).h, 120);
        assert!(HueSaturationSettings { hue: 181, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn hue_shift_red_to_green() {
        let s = HueSaturationSettings {
            hue: 120,
            ..Default::default()
        };
        assert_eq!(s.rgb(Rgb::new(255, 0, 0)), Rgb::new(0, 255, 0));
    }

    #[test]
    fn recolor_respects_transparency_and_range() {
        let grid = Grid::from_cells(
            3,
            1,
            vec![
                (Pos::new(0, 0), cell("#ff0000", "transparent")),
                (Pos::new(1, 0), cell("#00ff00", "#ff0000")),
                (Pos::new(2, 0), cell("not-a-color", "transparent")),
            ],
        );
        let settings = LevelsSettings {
            output_max: 128,
            color_range: ColorRange::Custom(vec!["#ff0000".into()]),
            ..Default::default()
        };
        let (out, affected) = levels(&grid, &settings);
        assert_eq!(affected, 2);
        assert_eq!(out.get(Pos::new(0, 0)).unwrap(), &cell("#800000", "transparent"));
        assert_eq!(out.get(Pos::new(1, 0)).unwrap(), &cell("#00ff00", "#800000"));
        assert_eq!(out.get(Pos::new(2, 0)).unwrap(), &cell("not-a-color", "transparent"));
        // input untouched
        assert_eq!(grid.get(Pos::new(0, 0)).unwrap(), &cell("#ff0000", "transparent"));
    }

    #[test]
    fn identity_levels_change_nothing() {
        let grid = Grid::from_cells(1, 1, vec![(Pos::new(0, 0), cell("#FF8000", "#123456"))]);
        let (out, affected) = levels(&grid, &LevelsSettings::default());
        assert_eq!(affected, 0);
        assert_eq!(out, grid);
    }

    proptest! {
        #[test]
        fn identity_levels_keep_every_channel(v in any::<u8>()) {
            prop_assert_eq!(LevelsSettings::default().channel(v), v);
        }

        #[test]
        fn raising_output_min_never_darkens(
            v in any::<u8>(),
            shadows in 0u8..=255,
            highlights in 0u8..=255,
            midtones in 0.1f64..=3.0,
            min in 0u8..255,
            max in 0u8..=255,
        ) {
            let low = levels_of(shadows, midtones, highlights, min, max);
            let high = levels_of(shadows, midtones, highlights, min + 1, max);
            prop_assert!(high.channel(v) >= low.channel(v));
        }
    }
}
