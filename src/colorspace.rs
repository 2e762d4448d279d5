//! # Colour spaces
//!
//! The two display modes sprite containers are authored for. The mode also decides how the
//! container body is stored and how many pixels one header width unit covers.

use std::path::Path;

use image::Rgba;

use crate::error::{Result, SpriteError};

pub const CGA_PALETTE: [Rgba<u8>; 4] = [
    Rgba([0, 0, 0, 255]),
    Rgba([0, 255, 255, 255]),
    Rgba([255, 0, 255, 255]),
    Rgba([255, 255, 255, 255]),
];

pub const EGA_PALETTE: [Rgba<u8>; 16] = [
    Rgba([0, 0, 0, 255]),       // black
    Rgba([0, 0, 170, 255]),     // blue
    Rgba([0, 170, 0, 255]),     // green
    Rgba([0, 170, 170, 255]),   // cyan
    Rgba([170, 0, 0, 255]),     // red
    Rgba([170, 0, 170, 255]),   // magenta
    Rgba([170, 170, 170, 255]), // light grey
    Rgba([255, 255, 85, 255]),  // yellow
    Rgba([0, 0, 0, 255]),       // black, the game has no bright magenta
    Rgba([85, 85, 85, 255]),    // dark grey
    Rgba([170, 85, 0, 255]),    // brown
    Rgba([85, 255, 85, 255]),   // bright green
    Rgba([85, 255, 255, 255]),  // bright cyan
    Rgba([255, 85, 85, 255]),   // bright red
    Rgba([85, 85, 255, 255]),   // bright blue
    Rgba([255, 255, 255, 255]), // white
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// `.CMP`: 2 bits per pixel, run-length packed
    Cga,
    /// `.EMP`: 4 bitplanes, stored
    Ega,
}

impl ColorSpace {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_uppercase().as_str() {
            "CMP" => Ok(ColorSpace::Cga),
            "EMP" => Ok(ColorSpace::Ega),
            _ => Err(SpriteError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn palette(&self) -> &'static [Rgba<u8>] {
        match self {
            ColorSpace::Cga => &CGA_PALETTE,
            ColorSpace::Ega => &EGA_PALETTE,
        }
    }

    /// Pixels covered by one unit of the sprite header width
    pub fn pixels_per_width_unit(&self) -> u32 {
        match self {
            ColorSpace::Cga => 4,
            ColorSpace::Ega => 8,
        }
    }

    pub fn is_run_length_packed(&self) -> bool {
        matches!(self, ColorSpace::Cga)
    }
}
