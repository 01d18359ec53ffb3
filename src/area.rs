use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::content::{Cell, Grid, Pos};

/// Which attributes of the origin cell a candidate must share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    pub match_char: bool,
    pub match_color: bool,
    pub match_bg_color: bool,
    /// Grow a 4-connected region from the origin instead of selecting globally.
    pub contiguous: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            match_char: true,
            match_color: true,
            match_bg_color: true,
            contiguous: true,
        }
    }
}

impl MatchOptions {
    /// True when `candidate` agrees with `origin` on every enabled attribute.
    /// With no attribute enabled everything matches.
    pub fn matches(&self, origin: &Cell, candidate: &Cell) -> bool {
        (!self.match_char || origin.character == candidate.character)
            && (!self.match_color || origin.foreground == candidate.foreground)
            && (!self.match_bg_color || origin.background == candidate.background)
    }
}

/// Positions selected from `origin`.
///
/// Empty positions take part as empty cells. Candidates are always compared
/// with the origin's attributes, never with the neighbour they were reached
/// from. An origin outside the grid selects nothing.
pub fn select(grid: &Grid, origin: Pos, options: MatchOptions) -> HashSet<Pos> {
    if !grid.in_bounds(origin) {
        return HashSet::new();
    }
    let target = grid.cell_or_empty(origin);

    if !options.contiguous {
        return grid
            .positions()
            .filter(|&pos| options.matches(&target, &grid.cell_or_empty(pos)))
            .collect();
    }

    let mut selected = HashSet::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(origin);
    queue.push_back(origin);
    while let Some(pos) = queue.pop_front() {
        if !options.matches(&target, &grid.cell_or_empty(pos)) {
            continue;
        }
        selected.insert(pos);
        for next in pos.neighbours() {
            if grid.in_bounds(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    tracing::trace!(origin = %origin, selected = selected.len(), "contiguous selection");
    selected
}
