use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Space character.
pub const SPACE: Char = Char { char: ' ' };

/// A validated single display glyph for a cell.
/// Control codes, combining marks and zero-width code points are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Char {
    pub(crate) char: char,
}

impl Char {
    /// Creates a new `Char` after validating the character.
    /// Returns `Err` if the character is not allowed.
    pub fn new(ch: char) -> Result<Self> {
        check_char(ch).map_or(Err(Error::DisallowedChar(ch.into())), |ok| {
            Ok(Self { char: ok })
        })
    }

    /// Creates a new `Char` if the character is allowed; otherwise returns the default.
    pub fn new_or(ch: char, default: Char) -> Char {
        check_char(ch).map_or(default, |ok| Char { char: ok })
    }

    /// Returns true for the blank glyph.
    pub fn is_space(&self) -> bool {
        *self == SPACE
    }
}

impl Default for Char {
    fn default() -> Self {
        SPACE
    }
}

impl Display for Char {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.char)
    }
}

impl From<Char> for char {
    fn from(ch: Char) -> char {
        ch.char
    }
}

impl From<Char> for String {
    fn from(ch: Char) -> String {
        ch.to_string()
    }
}

/// Parses a string slice containing exactly one character into a `Char`.
impl FromStr for Char {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::new(ch),
            _ => Err(Error::StrToCharConversion(s.chars().count())),
        }
    }
}

impl TryFrom<char> for Char {
    type Error = Error;
    fn try_from(value: char) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Char {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

/// Checks whether a character can be shown in a single cell.
/// Returns `Some(ch)` if allowed (with whitespace normalized to space),
/// or `None` if the character should be rejected.
pub fn check_char(ch: char) -> Option<char> {
    let cp = ch as u32;

    // Tab, Mongolian Vowel Separator and the "Space Separator" (Zs) set.
    if cp == 0x0009
        || cp == 0x180E
        || cp == 0x0020
        || cp == 0x00A0
        || cp == 0x1680
        || (0x2000..=0x200A).contains(&cp)
        || cp == 0x202F
        || cp == 0x205F
        || cp == 0x3000
    {
        return Some(' ');
    }

    // C0 and C1 controls
    if (0x0000..=0x001F).contains(&cp) || (0x007F..=0x009F).contains(&cp) {
        return None;
    }
    // Combining marks
    if (0x0300..=0x036F).contains(&cp) {
        return None;
    }
    // Zero-width, joiners and variation selectors
    if (0x200B..=0x200F).contains(&cp) || cp == 0xFEFF || (0xFE00..=0xFE0F).contains(&cp) {
        return None;
    }
    // Bidi controls
    if (0x202A..=0x202E).contains(&cp) || (0x2066..=0x2069).contains(&cp) {
        return None;
    }

    Some(ch)
}
