use serde::{Deserialize, Serialize};

use crate::area::{select, MatchOptions};
use crate::chars::Char;
use crate::colors::{mix, Color};
use crate::content::{Grid, Pos};
use crate::dither::Dither;
use crate::helpers::millis;

/// Most stops a lane may hold.
pub const MAX_STOPS: usize = 8;

/// A value that can live in a gradient lane.
pub trait LaneValue: Clone + PartialEq {
    /// Value between `a` (`f = 0`) and `b` (`f = 1`).
    fn lerp(a: &Self, b: &Self, f: f64) -> Self;
}

/// Glyphs never blend; the nearer stop wins.
impl LaneValue for Char {
    fn lerp(a: &Self, b: &Self, f: f64) -> Self {
        if f < 0.5 {
            *a
        } else {
            *b
        }
    }
}

/// Colors blend in RGB; anything unparsable falls back to the nearer stop.
impl LaneValue for Color {
    fn lerp(a: &Self, b: &Self, f: f64) -> Self {
        match (a.rgb(), b.rgb()) {
            (Some(x), Some(y)) => Color::from_rgb(mix(x, y, f)),
            _ if f < 0.5 => a.clone(),
            _ => b.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop<T> {
    pub position: f64,
    pub value: T,
}

impl<T> GradientStop<T> {
    pub fn new(position: f64, value: T) -> Self {
        Self {
            position: position.clamp(0.0, 1.0),
            value,
        }
    }
}

/// How a lane moves from one stop to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Blend colors; glyphs switch at the midpoint.
    #[default]
    Linear,
    /// Hold the left stop until the next one.
    Constant,
    /// Pick one of the two stops with a per-cell cutoff.
    Dither(Dither),
}

fn sort_stops<T>(stops: &mut [GradientStop<T>]) {
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
}

/// One gradient lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LaneSnapshot<T>")]
pub struct GradientProperty<T> {
    pub enabled: bool,
    stops: Vec<GradientStop<T>>,
    pub interpolation: Interpolation,
    pub dither_strength: f64,
}

// Deserialized lanes go through the same normalization as `new`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaneSnapshot<T> {
    enabled: bool,
    stops: Vec<GradientStop<T>>,
    interpolation: Interpolation,
    dither_strength: f64,
}

impl<T> From<LaneSnapshot<T>> for GradientProperty<T> {
    fn from(raw: LaneSnapshot<T>) -> Self {
        let mut stops = raw.stops;
        stops.truncate(MAX_STOPS);
        for stop in &mut stops {
            stop.position = stop.position.clamp(0.0, 1.0);
        }
        sort_stops(&mut stops);
        Self {
            enabled: raw.enabled,
            stops,
            interpolation: raw.interpolation,
            dither_strength: raw.dither_strength.clamp(0.0, 1.0),
        }
    }
}

impl<T: LaneValue> GradientProperty<T> {
    /// Creates an enabled lane; stops are sorted and capped at [`MAX_STOPS`].
    pub fn new(stops: Vec<GradientStop<T>>) -> Self {
        let mut lane = Self {
            enabled: true,
            stops,
            interpolation: Interpolation::Linear,
            dither_strength: 0.0,
        };
        lane.stops.truncate(MAX_STOPS);
        lane.sort();
        lane
    }

    /// Two stop lane from `from` at 0 to `to` at 1.
    pub fn between(from: T, to: T) -> Self {
        Self::new(vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)])
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation, dither_strength: f64) -> Self {
        self.interpolation = interpolation;
        self.dither_strength = dither_strength.clamp(0.0, 1.0);
        self
    }

    pub fn stops(&self) -> &[GradientStop<T>] {
        &self.stops
    }

    /// A lane with no stops is treated as disabled.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.stops.is_empty()
    }

    fn sort(&mut self) {
        sort_stops(&mut self.stops);
    }

    /// Bracketing stop indices and the local fraction between them.
    fn bracket(&self, t: f64) -> Option<(usize, usize, f64)> {
        let last = self.stops.len().checked_sub(1)?;
        // The far end always resolves to the last stop, even when stops coincide.
        if t >= 1.0 {
            return Some((last, last, 0.0));
        }
        if t <= self.stops[0].position {
            return Some((0, 0, 0.0));
        }
        if t >= self.stops[last].position {
            return Some((last, last, 0.0));
        }
        for (i, pair) in self.stops.windows(2).enumerate() {
            let (left, right) = (pair[0].position, pair[1].position);
            if left <= t && t <= right {
                let span = right - left;
                let f = if span > 0.0 { (t - left) / span } else { 0.0 };
                return Some((i, i + 1, f));
            }
        }
        Some((last, last, 0.0))
    }

    /// Resolves the lane at `t` for the cell at `pos`.
    pub fn sample(&self, t: f64, pos: Pos) -> Option<T> {
        let (l, r, f) = self.bracket(t)?;
        let (left, right) = (&self.stops[l].value, &self.stops[r].value);
        if l == r {
            return Some(left.clone());
        }
        let value = match self.interpolation {
            Interpolation::Linear => T::lerp(left, right, f),
            Interpolation::Constant => left.clone(),
            Interpolation::Dither(dither) => {
                if f < dither.threshold(pos, self.dither_strength) {
                    left.clone()
                } else {
                    right.clone()
                }
            }
        };
        Some(value)
    }

    /// Inserts a stop in the middle of the widest gap between neighbouring
    /// stops. A single stop splits the wider side of `[0, 1]`.
    /// Returns `false` when the lane is full or empty.
    pub fn add_stop(&mut self) -> bool {
        if self.stops.is_empty() || self.stops.len() >= MAX_STOPS {
            return false;
        }
        let stop = if let [only] = self.stops.as_slice() {
            let p = only.position;
            let position = if p >= 1.0 - p { p / 2.0 } else { (p + 1.0) / 2.0 };
            GradientStop::new(position, only.value.clone())
        } else {
            let mut best: Option<(usize, f64)> = None;
            for (i, pair) in self.stops.windows(2).enumerate() {
                let gap = pair[1].position - pair[0].position;
                if best.map_or(true, |(_, widest)| gap > widest) {
                    best = Some((i, gap));
                }
            }
            let Some((i, _)) = best else {
                return false;
            };
            // Midpoint of the gap, so the value is an even blend of its ends.
            let (left, right) = (&self.stops[i], &self.stops[i + 1]);
            GradientStop::new(
                (left.position + right.position) / 2.0,
                T::lerp(&left.value, &right.value, 0.5),
            )
        };
        self.stops.push(stop);
        self.sort();
        true
    }

    /// Removes the stop at `index`, keeping at least one.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if self.stops.len() <= 1 || index >= self.stops.len() {
            return false;
        }
        self.stops.remove(index);
        true
    }

    /// Moves a stop; indices held by callers are stale afterwards.
    pub fn set_stop_position(&mut self, index: usize, position: f64) -> bool {
        if index >= self.stops.len() || position.is_nan() {
            return false;
        }
        self.stops[index].position = position.clamp(0.0, 1.0);
        self.sort();
        true
    }

    pub fn set_stop_value(&mut self, index: usize, value: T) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                stop.value = value;
                true
            }
            None => false,
        }
    }

    /// Mirrors every stop around the middle of the lane.
    pub fn reverse(&mut self) {
        for stop in &mut self.stops {
            stop.position = 1.0 - stop.position;
        }
        self.sort();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientGeometry {
    /// `t` is the projection onto the start to end vector.
    #[default]
    Linear,
    /// `t` is the distance from start over the start to end distance.
    Radial,
}

/// Maps each cell to `t` in `[0, 1]` along the geometry and resolves the
/// three lanes there. A disabled lane leaves its part of the cell alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientDefinition {
    pub geometry: GradientGeometry,
    pub start: Pos,
    pub end: Pos,
    pub character: GradientProperty<Char>,
    #[serde(rename = "textColor")]
    pub foreground: GradientProperty<Color>,
    #[serde(rename = "backgroundColor")]
    pub background: GradientProperty<Color>,
}

impl Default for GradientDefinition {
    fn default() -> Self {
        Self {
            geometry: GradientGeometry::Linear,
            start: Pos::default(),
            end: Pos::default(),
            character: GradientProperty::new(vec![
                GradientStop::new(0.0, Char { char: '@' }),
                GradientStop::new(1.0, Char { char: '.' }),
            ]),
            foreground: GradientProperty::between(Color::new("#ffffff"), Color::new("#000000")),
            background: GradientProperty::between(Color::new("#000000"), Color::new("#ffffff")).disabled(),
        }
    }
}

impl GradientDefinition {
    /// Gradient parameter of the cell, `None` when start and end coincide.
    pub fn t(&self, pos: Pos) -> Option<f64> {
        let (sx, sy) = (f64::from(self.start.x), f64::from(self.start.y));
        let dx = f64::from(self.end.x) - sx;
        let dy = f64::from(self.end.y) - sy;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return None;
        }
        let px = f64::from(pos.x) - sx;
        let py = f64::from(pos.y) - sy;
        let t = match self.geometry {
            GradientGeometry::Linear => (px * dx + py * dy) / len2,
            GradientGeometry::Radial => (px * px + py * py).sqrt() / len2.sqrt(),
        };
        Some(t.clamp(0.0, 1.0))
    }

    fn any_lane_active(&self) -> bool {
        self.character.is_active() || self.foreground.is_active() || self.background.is_active()
    }

    /// Paints the gradient over `area`, returning the new grid.
    pub fn apply<I>(&self, area: I, grid: &Grid) -> Grid
    where
        I: IntoIterator<Item = Pos>,
    {
        self.apply_counted(area, grid).0
    }

    /// Like [`apply`](Self::apply), also counting cells whose value changed.
    ///
    /// Empty positions inside the area are painted starting from the empty
    /// cell; positions outside the grid are skipped. A position repeated in
    /// the area is counted once.
    #[tracing::instrument(skip_all, fields(geometry = ?self.geometry, start = %self.start, end = %self.end))]
    pub fn apply_counted<I>(&self, area: I, grid: &Grid) -> (Grid, usize)
    where
        I: IntoIterator<Item = Pos>,
    {
        let started = std::time::Instant::now();
        let mut out = grid.clone();
        if self.start == self.end {
            tracing::debug!("zero length gradient, nothing applied");
            return (out, 0);
        }
        if !self.any_lane_active() {
            return (out, 0);
        }

        let mut affected = 0;
        for pos in area {
            if !grid.in_bounds(pos) {
                continue;
            }
            let t = match self.t(pos) {
                Some(t) => t,
                None => continue,
            };
            let old = out.cell_or_empty(pos);
            let mut cell = old.clone();
            if self.character.is_active() {
                if let Some(ch) = self.character.sample(t, pos) {
                    cell.character = ch;
                }
            }
            if self.foreground.is_active() {
                if let Some(color) = self.foreground.sample(t, pos) {
                    cell.foreground = color;
                }
            }
            if self.background.is_active() {
                if let Some(color) = self.background.sample(t, pos) {
                    cell.background = color;
                }
            }
            if cell != old {
                affected += 1;
                out.set(pos, cell);
            }
        }
        tracing::debug!(affected, elapsed_ms = millis(started.elapsed()), "gradient applied");
        (out, affected)
    }
}

/// A gradient painted over the area grown from `origin`, re-selected on
/// every grid it is applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientFill {
    pub definition: GradientDefinition,
    pub origin: Pos,
    pub options: MatchOptions,
}

impl GradientFill {
    pub fn apply(&self, grid: &Grid) -> (Grid, usize) {
        let area = select(grid, self.origin, self.options);
        self.definition.apply_counted(area, grid)
    }
}
