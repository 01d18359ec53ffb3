pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building engine values or applying transforms.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Failed to parse color string.
    #[error("failed to parse color: {0}")]
    ColorParsing(String),

    /// Character with disallowed code point.
    #[error("disallowed char with code: {0}")]
    DisallowedChar(u32),
    /// Failed to convert string to single character (invalid length).
    #[error("cannot convert str with length {0} to single Char")]
    StrToCharConversion(usize),

    /// Failed to parse an `x,y` position key.
    #[error("failed to parse position: {0}")]
    PositionParsing(String),

    /// An effect setting is outside of its documented range.
    #[error("setting '{field}' out of range: {value}")]
    InvalidSetting { field: &'static str, value: String },

    /// A caller supplied transform failed on a grid.
    #[error("transform failed: {0}")]
    Transform(String),
}

impl Error {
    pub fn invalid_setting(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidSetting {
            field,
            value: value.to_string(),
        }
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }
}
