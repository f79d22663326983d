//! RGB color handling for rendering.
//!
//! Colors serialize as `#RRGGBB` strings. Excel-style `AARRGGBB` input is
//! accepted and the alpha byte is dropped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XlrenderError};

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string, with or without `#`.
    ///
    /// Accepts `RRGGBB` and Excel's `AARRGGBB`.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Color`] for any other shape.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let hex = match hex.len() {
            6 => hex,
            8 => hex.get(2..).unwrap_or_default(),
            _ => return Err(XlrenderError::Color(s.to_string())),
        };
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| XlrenderError::Color(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Convert to `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Relative luminance in 0.0..=1.0, using 0.299*R + 0.587*G + 0.114*B.
    pub fn luminance(self) -> f64 {
        let r = f64::from(self.r);
        let g = f64::from(self.g);
        let b = f64::from(self.b);
        (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
    }

    /// Check if this is a light color (luminance > 0.5).
    pub fn is_light(self) -> bool {
        self.luminance() > 0.5
    }

    /// Black on light backgrounds, white on dark ones.
    pub fn contrast_color(self) -> Rgb {
        if self.is_light() {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }

    /// Linear interpolation toward `other`; `t` is clamped to 0.0..=1.0.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
        }
    }

    /// Lighten the color by blending with white.
    pub fn lighten(self, factor: f64) -> Self {
        self.lerp(Rgb::WHITE, factor)
    }

    /// Darken the color by blending with black.
    pub fn darken(self, factor: f64) -> Self {
        self.lerp(Rgb::BLACK, factor)
    }
}

/// Linear interpolation for u8 values.
/// The cast is safe because we clamp to [0, 255] before converting.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = XlrenderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = XlrenderError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}
