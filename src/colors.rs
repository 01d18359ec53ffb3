use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::helpers::channel;

/// Text used for the transparent sentinel.
pub const TRANSPARENT: &str = "transparent";

/// Foreground or background value of a cell.
///
/// Non transparent values keep their original text so that exact-string
/// matching (custom color ranges, remap keys) sees what the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Color {
    /// No color, the canvas shows through.
    #[default]
    Transparent,
    /// Any other color text, usually `#rrggbb`.
    Value(String),
}

impl Color {
    /// Builds a color from text, recognising the transparent sentinel.
    pub fn new(s: &str) -> Self {
        if s == TRANSPARENT {
            Self::Transparent
        } else {
            Self::Value(s.into())
        }
    }

    /// Builds a `#rrggbb` color.
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self::Value(rgb_to_hex(rgb))
    }

    pub fn is_transparent(&self) -> bool {
        *self == Self::Transparent
    }

    /// Returns the raw text of the color.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transparent => TRANSPARENT,
            Self::Value(s) => s.as_str(),
        }
    }

    /// Parses the color into RGB; `None` for transparent or malformed values.
    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            Self::Transparent => None,
            Self::Value(s) => hex_to_rgb(s),
        }
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        if s == TRANSPARENT {
            Self::Transparent
        } else {
            Self::Value(s)
        }
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        match c {
            Color::Transparent => TRANSPARENT.into(),
            Color::Value(s) => s,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rounds and clamps real channel values.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// Applies `f` to every channel.
    pub fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }
}

/// Parses `rrggbb` / `#rrggbb` in any case.
impl FromStr for Rgb {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s).ok_or_else(|| Error::ColorParsing(s.into()))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// HSL with hue in degrees `0..=359`, saturation and lightness in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

/// HSV with hue in degrees `0..=359`, saturation and value in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u16,
    pub s: u8,
    pub v: u8,
}

/// Parses a 6 digit hex color, `#` optional, case-insensitive.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

/// Formats as lowercase `#rrggbb`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_string()
}

/// Re-emits a parsable hex color in canonical `#rrggbb` form.
pub fn normalize_hex(hex: &str) -> Option<String> {
    hex_to_rgb(hex).map(rgb_to_hex)
}

/// Component-wise linear mix, `f = 0` gives `a`, `f = 1` gives `b`.
pub fn mix(a: Rgb, b: Rgb, f: f64) -> Rgb {
    let lerp = |x: u8, y: u8| x as f64 + (y as f64 - x as f64) * f;
    Rgb::from_f64(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

// Hue in [0, 1) for the max/min/delta formula shared by HSL and HSV.
fn hue(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    h / 6.0
}

fn degrees(h: f64) -> u16 {
    ((h * 360.0).round() as u16) % 360
}

fn percent(v: f64) -> u8 {
    (v * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl {
            h: 0,
            s: 0,
            l: percent(l),
        };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    Hsl {
        h: degrees(hue(r, g, b, max, d)),
        s: percent(s),
        l: percent(l),
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = (hsl.h % 360) as f64 / 360.0;
    let s = hsl.s.min(100) as f64 / 100.0;
    let l = hsl.l.min(100) as f64 / 100.0;

    if s == 0.0 {
        return Rgb::from_f64(l * 255.0, l * 255.0, l * 255.0);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb::from_f64(
        hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_rgb(p, q, h) * 255.0,
        hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let s = if max == 0.0 { 0.0 } else { d / max };
    let h = if max == min { 0 } else { degrees(hue(r, g, b, max, d)) };
    Hsv {
        h,
        s: percent(s),
        v: percent(max),
    }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = (hsv.h % 360) as f64 / 60.0;
    let s = hsv.s.min(100) as f64 / 100.0;
    let v = hsv.v.min(100) as f64 / 100.0;

    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::from_f64(r * 255.0, g * 255.0, b * 255.0)
}

/// Hex to HSL, `None` when the text does not parse.
pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    hex_to_rgb(hex).map(rgb_to_hsl)
}

pub fn hsl_to_hex(hsl: Hsl) -> String {
    rgb_to_hex(hsl_to_rgb(hsl))
}
