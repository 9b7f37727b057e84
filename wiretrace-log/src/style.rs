//! Style directives attached to `%c` placeholders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 24-bit color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Create a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }
}

/// Error returned when a color literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbError(String);

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color literal: {}", self.0)
    }
}

impl std::error::Error for ParseRgbError {}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRgbError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());

        match hex.len() {
            6 => Ok(Rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #rgb shorthand: each digit is doubled
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseRgbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// An ordered list of CSS-like declarations, rendered as `name: value;`.
///
/// ```
/// use wiretrace_log::{Rgb, Style};
///
/// let style = Style::new()
///     .background(Rgb::new(0x54, 0xb7, 0xd3))
///     .padding("2px");
/// assert_eq!(style.to_string(), "background: #54b7d3; padding: 2px;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(&'static str, String)>,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push((name, value.into()));
        self
    }

    /// Set the background color.
    pub fn background(self, color: Rgb) -> Self {
        self.declare("background", color.to_string())
    }

    /// Set the text color.
    pub fn color(self, color: Rgb) -> Self {
        self.declare("color", color.to_string())
    }

    /// Keep the surrounding text color.
    pub fn color_inherit(self) -> Self {
        self.declare("color", "inherit")
    }

    /// Render bold text.
    pub fn bold(self) -> Self {
        self.declare("font-weight", "bold")
    }

    /// Set the padding.
    pub fn padding(self, value: &str) -> Self {
        self.declare("padding", value)
    }

    /// Set the border radius.
    pub fn border_radius(self, value: &str) -> Self {
        self.declare("border-radius", value)
    }

    /// Set the font size.
    pub fn font_size(self, value: &str) -> Self {
        self.declare("font-size", value)
    }

    /// Iterate over `(name, value)` declarations in insertion order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
    }

    /// Look up the last value declared for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .last()
    }

    /// Parsed background color, if any.
    pub fn background_rgb(&self) -> Option<Rgb> {
        self.get("background").and_then(|v| v.parse().ok())
    }

    /// Parsed text color, if any (`inherit` yields `None`).
    pub fn color_rgb(&self) -> Option<Rgb> {
        self.get("color").and_then(|v| v.parse().ok())
    }

    /// Whether the style asks for bold text.
    pub fn is_bold(&self) -> bool {
        self.get("font-weight") == Some("bold")
    }

    /// Whether the style declares any padding.
    pub fn is_padded(&self) -> bool {
        self.get("padding").is_some()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", name, value)?;
        }
        Ok(())
    }
}
