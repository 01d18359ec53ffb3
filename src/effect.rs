use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::content::Grid;
use crate::error::Result;
use crate::helpers::millis;
use crate::remap::{remap_characters, remap_colors, RemapCharactersSettings, RemapColorsSettings};
use crate::tone::{hue_saturation, levels, HueSaturationSettings, LevelsSettings};

/// An effect together with its settings snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "settings", rename_all = "snake_case")]
pub enum Effect {
    Levels(LevelsSettings),
    HueSaturation(HueSaturationSettings),
    RemapColors(RemapColorsSettings),
    RemapCharacters(RemapCharactersSettings),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Levels,
    HueSaturation,
    RemapColors,
    RemapCharacters,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectKind::Levels => "levels",
            EffectKind::HueSaturation => "hue-saturation",
            EffectKind::RemapColors => "remap-colors",
            EffectKind::RemapCharacters => "remap-characters",
        };
        write!(f, "{}", name)
    }
}

/// Result of applying an effect to one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    pub grid: Grid,
    /// Cells with at least one changed value.
    pub affected_cells: usize,
    pub elapsed: Duration,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Levels(_) => EffectKind::Levels,
            Effect::HueSaturation(_) => EffectKind::HueSaturation,
            Effect::RemapColors(_) => EffectKind::RemapColors,
            Effect::RemapCharacters(_) => EffectKind::RemapCharacters,
        }
    }

    /// Checks settings against their documented ranges.
    pub fn validate(&self) -> Result<()> {
        match self {
            Effect::Levels(s) => s.validate(),
            Effect::HueSaturation(s) => s.validate(),
            Effect::RemapColors(_) | Effect::RemapCharacters(_) => Ok(()),
        }
    }

    /// Applies the effect, producing a new grid. `grid` is not modified.
    #[tracing::instrument(skip_all, fields(kind = %self.kind(), cells = grid.len()))]
    pub fn apply(&self, grid: &Grid) -> Result<EffectOutcome> {
        let started = Instant::now();
        self.validate()?;
        let (grid, affected_cells) = match self {
            Effect::Levels(s) => levels(grid, s),
            Effect::HueSaturation(s) => hue_saturation(grid, s),
            Effect::RemapColors(s) => remap_colors(grid, s),
            Effect::RemapCharacters(s) => remap_characters(grid, s),
        };
        let elapsed = started.elapsed();
        tracing::debug!(affected_cells, elapsed_ms = millis(elapsed), "effect applied");
        Ok(EffectOutcome {
            grid,
            affected_cells,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::Char;
    use crate::content::{Cell, Pos};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn ch(c: char) -> Char {
        Char::new(c).unwrap()
    }

    #[test]
    fn dispatches_by_variant() {
        let grid = Grid::from_cells(
            2,
            1,
            vec![
                (Pos::new(0, 0), Cell::glyph(ch('A'))),
                (Pos::new(1, 0), Cell::glyph(ch('B'))),
            ],
        );
        let effect = Effect::RemapCharacters(RemapCharactersSettings {
            character_mappings: [(ch('A'), ch('Z'))].into_iter().collect(),
            preserve_spacing: true,
        });
        let outcome = effect.apply(&grid).unwrap();
        assert_eq!(outcome.affected_cells, 1);
        assert_eq!(outcome.grid.get(Pos::new(0, 0)).unwrap().character, ch('Z'));
        assert_eq!(outcome.grid.get(Pos::new(1, 0)).unwrap().character, ch('B'));
        assert_eq!(grid.get(Pos::new(0, 0)).unwrap().character, ch('A'));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let effect = Effect::Levels(LevelsSettings {
            midtones_input: 4.0,
            ..Default::default()
        });
        assert_eq!(
            effect.apply(&Grid::new(1, 1)).unwrap_err(),
            Error::invalid_setting("midtonesInput", 4.0)
        );
    }

    #[test]
    fn settings_snapshot_is_tagged() {
        let effect = Effect::HueSaturation(HueSaturationSettings {
            hue: 90,
            ..Default::default()
        });
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["kind"], "hue_saturation");
        assert_eq!(json["settings"]["hue"], 90);
        assert_eq!(json["settings"]["colorRange"]["type"], "all");
        let back: Effect = serde_json::from_value(json).unwrap();
        assert_eq!(back, effect);
        assert_eq!(back.kind().to_string(), "hue-saturation");
    }
}
