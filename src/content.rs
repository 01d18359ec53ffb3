use core::fmt;
use std::collections::HashMap;
use std::str::FromStr;

use ordermap::OrderSet;
use serde::{Deserialize, Serialize};

use crate::{
    chars::{Char, SPACE},
    colors::Color,
    error::{Error, Result},
};

/// Grid position of a cell. Serialized as the `"x,y"` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours.
    pub fn neighbours(&self) -> [Pos; 4] {
        [
            Pos::new(self.x + 1, self.y),
            Pos::new(self.x - 1, self.y),
            Pos::new(self.x, self.y + 1),
            Pos::new(self.x, self.y - 1),
        ]
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Pos {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let err = || Error::PositionParsing(s.into());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse::<i32>().map_err(|_| err())?;
        let y = y.trim().parse::<i32>().map_err(|_| err())?;
        Ok(Self { x, y })
    }
}

impl TryFrom<String> for Pos {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

impl From<Pos> for String {
    fn from(pos: Pos) -> String {
        pos.to_string()
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A single cell: one glyph plus foreground and background colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub character: Char,
    #[serde(rename = "color")]
    pub foreground: Color,
    #[serde(rename = "bgColor")]
    pub background: Color,
}

impl Cell {
    pub fn new(character: Char, foreground: Color, background: Color) -> Self {
        Self {
            character,
            foreground,
            background,
        }
    }

    /// A cell carrying only a glyph.
    pub fn glyph(character: Char) -> Self {
        Self {
            character,
            ..Self::default()
        }
    }

    /// Returns true if this cell looks like an absent one.
    pub fn is_empty(&self) -> bool {
        self.character == SPACE && self.foreground.is_transparent() && self.background.is_transparent()
    }
}

/// Sparse cell grid. Missing positions are empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grid {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: HashMap<Pos, Cell>,
}

impl Grid {
    /// Creates an empty grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
        }
    }

    /// Creates a grid filled with `fill` in every position.
    pub fn filled(width: usize, height: usize, fill: Cell) -> Self {
        let mut grid = Self::new(width, height);
        for pos in grid.positions() {
            grid.cells.insert(pos, fill.clone());
        }
        grid
    }

    /// Builds a grid from `(position, cell)` pairs, dropping positions out of bounds.
    pub fn from_cells<I>(width: usize, height: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (Pos, Cell)>,
    {
        let mut grid = Self::new(width, height);
        for (pos, cell) in cells {
            grid.set(pos, cell);
        }
        grid
    }

    /// Returns the width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of stored (non absent) cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Gets the stored cell at `pos`.
    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// Gets the cell at `pos`, or the empty cell if nothing is stored there.
    pub fn cell_or_empty(&self, pos: Pos) -> Cell {
        self.cells.get(&pos).cloned().unwrap_or_default()
    }

    /// Sets the cell at `pos`; out of bounds writes are ignored.
    pub fn set(&mut self, pos: Pos, new: Cell) {
        if self.in_bounds(pos) {
            self.cells.insert(pos, new);
        }
    }

    /// Removes the cell at `pos`, making it empty.
    pub fn remove(&mut self, pos: Pos) -> Option<Cell> {
        self.cells.remove(&pos)
    }

    /// Iterates stored cells in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pos, &Cell)> {
        self.cells.iter()
    }

    /// Every in-bounds position, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }

    /// Stored positions ordered row by row.
    pub fn sorted_positions(&self) -> Vec<Pos> {
        let mut keys: Vec<Pos> = self.cells.keys().copied().collect();
        keys.sort_by_key(|p| (p.y, p.x));
        keys
    }

    /// Distinct glyphs in row-major discovery order.
    pub fn distinct_chars(&self) -> OrderSet<Char> {
        self.sorted_positions()
            .into_iter()
            .map(|pos| self.cells[&pos].character)
            .collect()
    }

    /// Distinct non transparent foreground and background colors in
    /// row-major discovery order.
    pub fn distinct_colors(&self) -> OrderSet<Color> {
        let mut set = OrderSet::new();
        for pos in self.sorted_positions() {
            let cell = &self.cells[&pos];
            for color in [&cell.foreground, &cell.background] {
                if !color.is_transparent() {
                    set.insert(color.clone());
                }
            }
        }
        set
    }

    /// Checks if the grid contains the given glyph.
    pub fn contains_char(&self, ch: Char) -> bool {
        self.cells.values().any(|c| c.character == ch)
    }
}

/// One animation frame: a cell grid shown for `duration` milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub grid: Grid,
    pub duration: u64,
}

impl Frame {
    pub fn new(grid: Grid, duration: u64) -> Self {
        Self { grid, duration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ch(c: char) -> Char {
        Char::new(c).unwrap()
    }

    #[test]
    fn pos_key_round_trip() {
        assert_eq!("3,-2".parse::<Pos>().unwrap(), Pos::new(3, -2));
        assert_eq!(Pos::new(10, 4).to_string(), "10,4");
        assert!("3;2".parse::<Pos>().is_err());
        assert!("a,2".parse::<Pos>().is_err());
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut grid = Grid::new(2, 2);
        grid.set(Pos::new(1, 1), Cell::glyph(ch('A')));
        grid.set(Pos::new(2, 0), Cell::glyph(ch('B')));
        grid.set(Pos::new(-1, 0), Cell::glyph(ch('C')));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.cell_or_empty(Pos::new(0, 0)), Cell::default());
        assert!(grid.cell_or_empty(Pos::new(0, 0)).is_empty());
    }

    #[test]
    fn distinct_values_in_row_major_order() {
        let grid = Grid::from_cells(
            3,
            2,
            vec![
                (Pos::new(2, 1), Cell::new(ch('C'), "#00ff00".into(), Color::Transparent)),
                (Pos::new(0, 0), Cell::new(ch('B'), "#ff0000".into(), "#000000".into())),
                (Pos::new(1, 0), Cell::new(ch('A'), "#ff0000".into(), Color::Transparent)),
            ],
        );
        let chars: Vec<char> = grid.distinct_chars().into_iter().map(char::from).collect();
        assert_eq!(chars, vec!['B', 'A', 'C']);
        let colors: Vec<String> = grid.distinct_colors().iter().map(|c| c.to_string()).collect();
        assert_eq!(colors, vec!["#ff0000", "#000000", "#00ff00"]);
    }

    #[test]
    fn grid_serializes_with_position_keys() {
        let grid = Grid::from_cells(2, 1, vec![(Pos::new(1, 0), Cell::glyph(ch('x')))]);
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["cells"]["1,0"]["character"], "x");
        assert_eq!(json["cells"]["1,0"]["bgColor"], "transparent");
        let back: Grid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }
}
