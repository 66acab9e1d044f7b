//! Visual layout policy for the composed wallpaper.
//!
//! The pipeline only reads these values; changing a color, a font size or an
//! offset never touches the composition code.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WallpaperError};

pub const IMAGE_WIDTH_RATIO: f64 = 0.6;
pub const BACKGROUND_COLOR: &str = "#F5F1E8";

pub const PRIMARY_TEXT_COLOR: &str = "#2C2C2C";
pub const PRIMARY_TEXT_SIZE: f32 = 56.0;
pub const PRIMARY_OFFSET_ABOVE: f32 = 60.0;

pub const SECONDARY_TEXT_COLOR: &str = "#6B6B6B";
pub const SECONDARY_TEXT_SIZE: f32 = 44.0;
pub const SECONDARY_OFFSET_BELOW: f32 = 80.0;
pub const SECONDARY_PREFIX: &str = "Code: ";

pub const CAPTION_TEXT: &str = "1 in";
pub const CAPTION_TEXT_SIZE: f32 = 36.0;
pub const CAPTION_GAP: f32 = 60.0;

/// Largest glyph height the raster canvas draws.
pub const MAX_TEXT_SIZE: f32 = 512.0;

/// An opaque or translucent RGBA color, written as `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba<u8>);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba([r, g, b, 0xFF]))
    }

    pub fn rgba(&self) -> Rgba<u8> {
        self.0
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{s}' must start with '#'"))?;
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| format!("color '{s}' is not hexadecimal"))?;
        let [a, r, g, b] = match hex.len() {
            6 => (value | 0xFF00_0000).to_be_bytes(),
            8 => value.to_be_bytes(),
            _ => return Err(format!("color '{s}' must have 6 or 8 hex digits")),
        };
        Ok(Self(Rgba([r, g, b, a])))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0 .0;
        if a == 0xFF {
            write!(f, "#{r:02X}{g:02X}{b:02X}")
        } else {
            write!(f, "#{a:02X}{r:02X}{g:02X}{b:02X}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    /// Glyph height in pixels.
    pub size: f32,
    #[serde(default)]
    pub weight: Weight,
}

/// Every tunable constant of the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Side of the square image as a fraction of the screen width.
    pub image_width_ratio: f64,
    pub background: Color,
    pub primary: TextStyle,
    /// Distance from the image top edge up to the primary label baseline.
    pub primary_offset_above: f32,
    pub secondary: TextStyle,
    /// Distance from the image bottom edge down to the secondary label baseline.
    pub secondary_offset_below: f32,
    pub secondary_prefix: String,
    pub caption: TextStyle,
    pub caption_text: String,
    /// Distance between the secondary label and caption baselines.
    pub caption_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            image_width_ratio: IMAGE_WIDTH_RATIO,
            background: Color::rgb(0xF5, 0xF1, 0xE8),
            primary: TextStyle {
                color: Color::rgb(0x2C, 0x2C, 0x2C),
                size: PRIMARY_TEXT_SIZE,
                weight: Weight::Bold,
            },
            primary_offset_above: PRIMARY_OFFSET_ABOVE,
            secondary: TextStyle {
                color: Color::rgb(0x6B, 0x6B, 0x6B),
                size: SECONDARY_TEXT_SIZE,
                weight: Weight::Regular,
            },
            secondary_offset_below: SECONDARY_OFFSET_BELOW,
            secondary_prefix: SECONDARY_PREFIX.to_string(),
            caption: TextStyle {
                color: Color::rgb(0x6B, 0x6B, 0x6B),
                size: CAPTION_TEXT_SIZE,
                weight: Weight::Regular,
            },
            caption_text: CAPTION_TEXT.to_string(),
            caption_gap: CAPTION_GAP,
        }
    }
}

impl TextStyle {
    fn validate(&self, name: &str) -> Result<()> {
        if !(self.size.is_finite() && self.size > 0.0 && self.size <= MAX_TEXT_SIZE) {
            return Err(WallpaperError::unexpected(format!(
                "layout: {name} size {} is outside (0, {MAX_TEXT_SIZE}]",
                self.size
            )));
        }
        Ok(())
    }
}

impl LayoutConfig {
    /// Reject values that cannot be composed: the image ratio must lie in
    /// (0, 1], text sizes in (0, [`MAX_TEXT_SIZE`]] and offsets be finite.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.image_width_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(WallpaperError::unexpected(format!(
                "layout: image_width_ratio {ratio} is outside (0, 1]"
            )));
        }
        self.primary.validate("primary")?;
        self.secondary.validate("secondary")?;
        self.caption.validate("caption")?;

        for (name, offset) in [
            ("primary_offset_above", self.primary_offset_above),
            ("secondary_offset_below", self.secondary_offset_below),
            ("caption_gap", self.caption_gap),
        ] {
            if !offset.is_finite() {
                return Err(WallpaperError::unexpected(format!("layout: {name} {offset} is not finite")));
            }
        }
        Ok(())
    }

    /// Secondary label text as drawn on the wallpaper.
    pub fn secondary_text(&self, label: &str) -> String {
        format!("{}{}", self.secondary_prefix, label)
    }
}
