use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::content::{Frame, Grid};
use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::gradient::GradientFill;
use crate::helpers::millis;

/// Anything that turns one grid into a new grid plus an affected-cell count.
pub trait FrameTransform {
    fn transform(&self, grid: &Grid) -> Result<(Grid, usize)>;
}

impl FrameTransform for Effect {
    fn transform(&self, grid: &Grid) -> Result<(Grid, usize)> {
        let outcome = self.apply(grid)?;
        Ok((outcome.grid, outcome.affected_cells))
    }
}

impl FrameTransform for GradientFill {
    fn transform(&self, grid: &Grid) -> Result<(Grid, usize)> {
        Ok(self.apply(grid))
    }
}

impl<F> FrameTransform for F
where
    F: Fn(&Grid) -> Result<(Grid, usize)>,
{
    fn transform(&self, grid: &Grid) -> Result<(Grid, usize)> {
        self(grid)
    }
}

/// Failure of one frame in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    /// 0-based frame index.
    pub index: usize,
    pub error: Error,
}

/// Result for one frame of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStep {
    pub index: usize,
    /// The transformed frame, or the original one on failure.
    pub frame: Frame,
    pub affected_cells: usize,
    pub error: Option<Error>,
}

/// Lazily transforms frames in order, one per `next` call. Dropping the
/// sweep stops it. A frame whose transform fails or panics is yielded
/// unchanged together with its error.
pub struct FrameSweep<'a, T: ?Sized> {
    transform: &'a T,
    frames: &'a [Frame],
    next: usize,
}

impl<'a, T: FrameTransform + ?Sized> FrameSweep<'a, T> {
    pub fn new(transform: &'a T, frames: &'a [Frame]) -> Self {
        Self {
            transform,
            frames,
            next: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.frames.len()
    }
}

impl<'a, T: FrameTransform + ?Sized> Iterator for FrameSweep<'a, T> {
    type Item = FrameStep;

    fn next(&mut self) -> Option<FrameStep> {
        let index = self.next;
        let source = self.frames.get(index)?;
        self.next += 1;

        let result = catch_unwind(AssertUnwindSafe(|| self.transform.transform(&source.grid)))
            .unwrap_or_else(|payload| Err(Error::transform(panic_message(payload.as_ref()))));
        let step = match result {
            Ok((grid, affected_cells)) => FrameStep {
                index,
                frame: Frame::new(grid, source.duration),
                affected_cells,
                error: None,
            },
            Err(error) => {
                tracing::warn!(index, %error, "frame left unchanged");
                FrameStep {
                    index,
                    frame: source.clone(),
                    affected_cells: 0,
                    error: Some(error),
                }
            }
        };
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.frames.len() - self.next;
        (left, Some(left))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic while transforming frame".into()
    }
}

/// Outcome of a full sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Same length and order as the input.
    pub frames: Vec<Frame>,
    pub total_affected: usize,
    pub elapsed: Duration,
    pub errors: Vec<FrameError>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Transforms every frame, calling `on_progress(index, total)` after each one.
#[tracing::instrument(skip_all, fields(frames = frames.len()))]
pub fn apply_to_frames<T, P>(transform: &T, frames: &[Frame], mut on_progress: P) -> BatchOutcome
where
    T: FrameTransform + ?Sized,
    P: FnMut(usize, usize),
{
    let started = Instant::now();
    let sweep = FrameSweep::new(transform, frames);
    let total = sweep.total();
    let mut outcome = BatchOutcome {
        frames: Vec::with_capacity(total),
        total_affected: 0,
        elapsed: Duration::ZERO,
        errors: Vec::new(),
    };
    for step in sweep {
        outcome.total_affected += step.affected_cells;
        if let Some(error) = step.error {
            outcome.errors.push(FrameError {
                index: step.index,
                error,
            });
        }
        outcome.frames.push(step.frame);
        on_progress(step.index, total);
    }
    outcome.elapsed = started.elapsed();
    tracing::debug!(
        total_affected = outcome.total_affected,
        failed = outcome.errors.len(),
        elapsed_ms = millis(outcome.elapsed),
        "batch finished"
    );
    outcome
}

/// [`apply_to_frames`] for an effect.
pub fn apply_effect_to_frames<P>(effect: &Effect, frames: &[Frame], on_progress: P) -> BatchOutcome
where
    P: FnMut(usize, usize),
{
    apply_to_frames(effect, frames, on_progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::MatchOptions;
    use crate::chars::Char;
    use crate::colors::Color;
    use crate::content::{Cell, Pos};
    use crate::gradient::{GradientDefinition, GradientProperty};
    use crate::remap::RemapCharactersSettings;
    use crate::tone::LevelsSettings;
    use pretty_assertions::assert_eq;

    fn ch(c: char) -> Char {
        Char::new(c).unwrap()
    }

    fn frame_of(c: char) -> Frame {
        Frame::new(
            Grid::from_cells(1, 1, vec![(Pos::new(0, 0), Cell::glyph(ch(c)))]),
            100,
        )
    }

    fn glyph(frame: &Frame) -> char {
        frame.grid.get(Pos::new(0, 0)).unwrap().character.into()
    }

    fn upcase(grid: &Grid) -> Result<(Grid, usize)> {
        let cell = grid.cell_or_empty(Pos::new(0, 0));
        let c: char = cell.character.into();
        if c == 'x' {
            return Err(Error::transform("cannot handle x"));
        }
        let mut out = grid.clone();
        out.set(Pos::new(0, 0), Cell::glyph(ch(c.to_ascii_uppercase())));
        Ok((out, 1))
    }

    #[test]
    fn failed_frame_is_kept_and_reported() {
        let frames = vec![frame_of('a'), frame_of('x'), frame_of('c')];
        let mut progress = Vec::new();
        let outcome = apply_to_frames(&upcase, &frames, |i, total| progress.push((i, total)));
        let glyphs: Vec<char> = outcome.frames.iter().map(glyph).collect();
        assert_eq!(glyphs, vec!['A', 'x', 'C']);
        assert_eq!(outcome.frames[1], frames[1]);
        assert_eq!(outcome.total_affected, 2);
        assert_eq!(
            outcome.errors,
            vec![FrameError {
                index: 1,
                error: Error::transform("cannot handle x"),
            }]
        );
        assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn panics_are_isolated() {
        let explode = |grid: &Grid| -> Result<(Grid, usize)> {
            if grid.contains_char(ch('b')) {
                panic!("bad frame");
            }
            Ok((grid.clone(), 0))
        };
        let frames = vec![frame_of('a'), frame_of('b')];
        let outcome = apply_to_frames(&explode, &frames, |_, _| {});
        assert_eq!(outcome.frames, frames);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].index, 1);
        assert_eq!(outcome.errors[0].error, Error::transform("bad frame"));
    }

    #[test]
    fn sweep_can_stop_early() {
        let frames = vec![frame_of('a'), frame_of('b'), frame_of('c')];
        let mut sweep = FrameSweep::new(&upcase, &frames);
        assert_eq!(sweep.size_hint(), (3, Some(3)));
        let first = sweep.next().unwrap();
        assert_eq!(glyph(&first.frame), 'A');
        assert_eq!(sweep.size_hint(), (2, Some(2)));
        drop(sweep);
        assert_eq!(glyph(&frames[0]), 'a');
    }

    #[test]
    fn effect_over_frames_keeps_durations() {
        let frames = vec![frame_of('a'), Frame::new(frame_of('q').grid, 40)];
        let effect = Effect::RemapCharacters(RemapCharactersSettings {
            character_mappings: [(ch('q'), ch('p'))].into_iter().collect(),
            preserve_spacing: true,
        });
        let outcome = apply_effect_to_frames(&effect, &frames, |_, _| {});
        assert!(outcome.is_clean());
        assert_eq!(outcome.total_affected, 1);
        assert_eq!(glyph(&outcome.frames[1]), 'p');
        assert_eq!(outcome.frames[1].duration, 40);
    }

    #[test]
    fn invalid_effect_fails_every_frame() {
        let frames = vec![frame_of('a'), frame_of('b')];
        let effect = Effect::Levels(LevelsSettings {
            midtones_input: 0.0,
            ..Default::default()
        });
        let outcome = apply_effect_to_frames(&effect, &frames, |_, _| {});
        assert_eq!(outcome.frames, frames);
        let indices: Vec<usize> = outcome.errors.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn gradient_fill_over_frames() {
        let fill = GradientFill {
            definition: GradientDefinition {
                start: Pos::new(0, 0),
                end: Pos::new(1, 0),
                character: GradientProperty::between(ch('<'), ch('>')),
                foreground: GradientProperty::between(Color::new("#000000"), Color::new("#ffffff")).disabled(),
                background: GradientProperty::between(Color::new("#000000"), Color::new("#ffffff")).disabled(),
                ..Default::default()
            },
            origin: Pos::new(0, 0),
            options: MatchOptions {
                match_char: false,
                ..Default::default()
            },
        };
        let frames = vec![Frame::new(Grid::new(2, 1), 50), Frame::new(Grid::new(2, 1), 50)];
        let outcome = apply_to_frames(&fill, &frames, |_, _| {});
        assert_eq!(outcome.total_affected, 4);
        for frame in &outcome.frames {
            assert_eq!(frame.grid.get(Pos::new(0, 0)).unwrap().character, ch('<'));
            assert_eq!(frame.grid.get(Pos::new(1, 0)).unwrap().character, ch('>'));
        }
    }
}
