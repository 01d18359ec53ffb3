use ordermap::OrderMap;
use serde::{Deserialize, Serialize};

use crate::chars::Char;
use crate::colors::Color;
use crate::content::Grid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemapColorsSettings {
    /// Source color text to target color text.
    pub color_mappings: OrderMap<String, String>,
    pub match_exact: bool,
    /// Lets a transparent foreground be looked up as a source.
    pub include_transparent: bool,
}

impl Default for RemapColorsSettings {
    fn default() -> Self {
        Self {
            color_mappings: OrderMap::new(),
            match_exact: true,
            include_transparent: false,
        }
    }
}

impl RemapColorsSettings {
    /// Finds the target for `color`.
    ///
    /// Exact key first. Unless `match_exact` is set, then a case-insensitive
    /// key, then the key with its leading `#` toggled.
    pub fn lookup(&self, color: &Color) -> Option<Color> {
        let key = color.as_str();
        if let Some(target) = self.color_mappings.get(key) {
            return Some(Color::new(target));
        }
        if self.match_exact {
            return None;
        }
        let find = |key: &str| {
            self.color_mappings
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| Color::new(v))
        };
        if let Some(target) = find(key) {
            return Some(target);
        }
        let toggled = match key.strip_prefix('#') {
            Some(bare) => bare.to_string(),
            None => format!("#{}", key),
        };
        find(&toggled)
    }

    fn remap(&self, color: &Color, background: bool) -> Option<Color> {
        if color.is_transparent() && (background || !self.include_transparent) {
            return None;
        }
        self.lookup(color).filter(|target| target != color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemapCharactersSettings {
    pub character_mappings: OrderMap<Char, Char>,
    /// Never rewrite blank cells.
    pub preserve_spacing: bool,
}

impl Default for RemapCharactersSettings {
    fn default() -> Self {
        Self {
            character_mappings: OrderMap::new(),
            preserve_spacing: true,
        }
    }
}

impl RemapCharactersSettings {
    pub fn lookup(&self, ch: Char) -> Option<Char> {
        if self.preserve_spacing && ch.is_space() {
            return None;
        }
        self.character_mappings.get(&ch).copied()
    }
}

pub fn remap_colors(grid: &Grid, settings: &RemapColorsSettings) -> (Grid, usize) {
    let mut out = grid.clone();
    let mut affected = 0;
    for cell in out.cells.values_mut() {
        let fg = settings.remap(&cell.foreground, false);
        let bg = settings.remap(&cell.background, true);
        if fg.is_none() && bg.is_none() {
            continue;
        }
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

pub fn remap_characters(grid: &Grid, settings: &RemapCharactersSettings) -> (Grid, usize) {
    let mut out = grid.clone();
    let mut affected = 0;
    for cell in out.cells.values_mut() {
        match settings.lookup(cell.character) {
            Some(target) if target != cell.character => {
                cell.character = target;
                affected += 1;
            }
            _ => {}
        }
    }
    (out, affected)
}

/// Rebuilds a glyph mapping for the glyphs present in `grid`.
///
/// Every glyph on the canvas gets an entry, keeping its previous target if it
/// had one and mapping to itself otherwise. Glyphs no longer present are
/// dropped. Entries follow row-major discovery order.
pub fn sync_character_mappings(existing: &OrderMap<Char, Char>, grid: &Grid) -> OrderMap<Char, Char> {
    grid.distinct_chars()
        .into_iter()
        .map(|ch| (ch, existing.get(&ch).copied().unwrap_or(ch)))
        .collect()
}

/// Color counterpart of [`sync_character_mappings`] over foreground and
/// background colors.
pub fn sync_color_mappings(existing: &OrderMap<String, String>, grid: &Grid) -> OrderMap<String, String> {
    grid.distinct_colors()
        .into_iter()
        .map(|color| {
            let key = String::from(color);
            let target = existing.get(&key).cloned().unwrap_or_else(|| key.clone());
            (key, target)
        })
        .collect()
}
