pub mod area;
pub mod batch;
pub mod chars;
pub mod colors;
pub mod content;
pub mod dither;
pub mod effect;
pub mod error;
pub mod font;
pub mod gradient;
mod helpers;
pub mod remap;
pub mod tone;
pub mod viewport;

pub use area::{select, MatchOptions};
pub use batch::{apply_effect_to_frames, apply_to_frames, BatchOutcome, FrameError, FrameSweep, FrameTransform};
pub use chars::Char;
pub use colors::{Color, Hsl, Hsv, Rgb};
pub use content::{Cell, Frame, Grid, Pos};
pub use dither::Dither;
pub use effect::{Effect, EffectKind, EffectOutcome};
pub use error::{Error, Result};
pub use font::Font;
pub use gradient::{
    GradientDefinition, GradientFill, GradientGeometry, GradientProperty, GradientStop, Interpolation,
};
pub use remap::{RemapCharactersSettings, RemapColorsSettings};
pub use tone::{ColorRange, HueSaturationSettings, LevelsSettings};
pub use viewport::{Pixel, Viewport};
