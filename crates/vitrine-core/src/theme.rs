//! Day/night themes and hex colors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid hex color '{0}': expected #rrggbb")]
    InvalidHex(String),
}

/// An sRGB color as written in CSS (`#rrggbb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    /// The dark grey used by the night theme
    pub const CHARCOAL: Rgb = Rgb::new(0x25, 0x25, 0x25);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Result<Self, ThemeError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ThemeError::InvalidHex(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ThemeError::InvalidHex(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as 0.0-1.0 floats (still sRGB encoded)
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Which palette is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }
}

/// Everything a theme switch changes: page colors, scene background and
/// where the two directional lights sit on the X axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePalette {
    /// Value written to `--primary-color`
    pub primary: Rgb,
    /// Value written to `--secondary-color`
    pub secondary: Rgb,
    pub background: Rgb,
    pub key_light_x: f32,
    pub fill_light_x: f32,
}

impl ThemePalette {
    pub fn day() -> Self {
        Self {
            primary: Rgb::CHARCOAL,
            secondary: Rgb::WHITE,
            background: Rgb::WHITE,
            key_light_x: -5.0,
            fill_light_x: 5.0,
        }
    }

    pub fn night() -> Self {
        Self {
            primary: Rgb::WHITE,
            secondary: Rgb::CHARCOAL,
            background: Rgb::CHARCOAL,
            key_light_x: 5.0,
            fill_light_x: -5.0,
        }
    }
}
