//! Color table for the visualizer
//!
//! Colors are passed into renderers at construction. Nothing reads a global
//! palette at draw time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse a `#RRGGBB` / `#RRGGBBAA` color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{0}': expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

/// 8-bit RGBA color
///
/// Serialized as a hex string so theme files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Source-over blend of `self` onto an opaque-or-not destination
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let sa = a as u32;
                let inv = 255 - sa;
                let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv + 127) / 255) as u8;
                let out_a = sa + (dst.a as u32 * inv + 127) / 255;
                Rgba::new(
                    mix(self.r, dst.r),
                    mix(self.g, dst.g),
                    mix(self.b, dst.b),
                    out_a.min(255) as u8,
                )
            }
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Colors for one two-party probability lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyColors {
    /// Bar color when party A dominates (value >= 0.5)
    pub party_a: Rgba,
    /// Bar color when party B dominates (value < 0.5)
    pub party_b: Rgba,
}

/// Visualizer color table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Surface background
    pub background: Rgba,
    /// Probability bar colors
    pub bars: PartyColors,
    /// Bar colors for the already-played portion
    pub progress: PartyColors,
    /// Bars of single-valued series such as entropy
    pub neutral: Rgba,
    /// Playback cursor line
    pub cursor: Rgba,
    /// Voice activity region fill, one per audio channel
    pub regions: [Rgba; 2],
    /// Translucent tint drawn over the overview thumbnail
    pub overview_overlay: Rgba,
    /// Overview indicator outline
    pub indicator_border: Rgba,
    /// Overview indicator fill
    pub indicator_fill: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0xFF, 0xFF, 0xFF),
            bars: PartyColors {
                party_a: Rgba::rgb(0x32, 0x8D, 0xE1),  // Speaker A - Blue (#328DE1)
                party_b: Rgba::rgb(0xFD, 0xA2, 0x30),  // Speaker B - Orange (#FDA230)
            },
            progress: PartyColors {
                party_a: Rgba::rgb(0x1C, 0x50, 0x80),
                party_b: Rgba::rgb(0x99, 0x62, 0x1D),
            },
            neutral: Rgba::rgb(0x80, 0x80, 0x80),
            cursor: Rgba::rgb(0xFF, 0x45, 0x00), // OrangeRed
            regions: [
                Rgba::new(0x32, 0x8D, 0xE1, 0x20),
                Rgba::new(0xFF, 0xAD, 0x34, 0x20),
            ],
            overview_overlay: Rgba::new(100, 100, 100, 26),
            indicator_border: Rgba::rgb(0x00, 0x80, 0x00),
            indicator_fill: Rgba::new(0x00, 0x80, 0x00, 0x18),
        }
    }
}

impl Theme {
    /// Region fill for an audio channel (channels past the table reuse the last color)
    pub fn region_color(&self, channel: usize) -> Rgba {
        self.regions[channel.min(self.regions.len() - 1)]
    }
}
