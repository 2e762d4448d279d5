use image::RgbaImage;

use crate::binary_utils::{bytes_at, u16_at, u32_at};
use crate::colorspace::ColorSpace;
use crate::error::{Result, SpriteError};
use crate::formats::toc::SpriteName;

pub const SPRITE_HEADER_SIZE: usize = 16;
pub const SPRITE_RESERVED_SIZE: usize = 12;

/// 16 byte header in front of every sprite's pixel data
///
/// | bytes | field |
/// |---|---|
/// | 0-1 | width, in colour space units |
/// | 2-3 | height |
/// | 4-15 | reserved, kept as-is |
/// | 8-9 | pos_x |
/// | 10-11 | pos_y |
/// | 12-15 | layer_info, EGA only |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteDescriptor {
    pub width: u16,
    pub height: u16,
    pub pos_x: u16,
    pub pos_y: u16,
    pub layer_info: u32,
    /// Bytes 4-15. Only pos_x, pos_y and layer_info are understood; 4-7 are unknown.
    pub reserved: [u8; SPRITE_RESERVED_SIZE],
}

impl SpriteDescriptor {
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let header = bytes_at(data, offset, SPRITE_HEADER_SIZE, "sprite header")?;

        let mut reserved = [0u8; SPRITE_RESERVED_SIZE];
        reserved.copy_from_slice(&header[4..SPRITE_HEADER_SIZE]);

        Ok(SpriteDescriptor {
            width: u16_at(header, 0, "sprite header")?,
            height: u16_at(header, 2, "sprite header")?,
            pos_x: u16_at(header, 8, "sprite header")?,
            pos_y: u16_at(header, 10, "sprite header")?,
            layer_info: u32_at(header, 12, "sprite header")?,
            reserved,
        })
    }

    /// A 0x0 sprite has no pixels and is never written out
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Width in pixels once a header unit is expanded for the colour space
    pub fn pixel_width(&self, color_space: ColorSpace) -> u32 {
        self.width as u32 * color_space.pixels_per_width_unit()
    }

    pub fn reserved_hex(&self) -> String {
        self.reserved
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Decoded sprite plus where it goes on screen
#[derive(Clone, Debug)]
pub struct SpriteBitmap {
    pub name: SpriteName,
    pub descriptor: SpriteDescriptor,
    pub image: RgbaImage,
}

impl SpriteBitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn position(&self) -> (u32, u32) {
        (self.descriptor.pos_x as u32, self.descriptor.pos_y as u32)
    }
}

/// Fails unless `data` holds `length` bytes of pixel data from `pixel_offset`. `None` stands
/// for a length that overflowed `usize`.
pub(crate) fn ensure_pixel_data(
    data: &[u8],
    pixel_offset: usize,
    length: Option<usize>,
    sprite: &SpriteName,
) -> Result<()> {
    let end = length.and_then(|length| pixel_offset.checked_add(length));
    match end {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(SpriteError::SpriteDataOutOfRange {
            sprite: sprite.to_string(),
            index: end.map_or(usize::MAX, |end| end - 1),
            len: data.len(),
        }),
    }
}

/// Bounds-checked read of one byte of a sprite's pixel data
pub(crate) fn pixel_byte(data: &[u8], index: usize, sprite: &SpriteName) -> Result<u8> {
    data.get(index)
        .copied()
        .ok_or_else(|| SpriteError::SpriteDataOutOfRange {
            sprite: sprite.to_string(),
            index,
            len: data.len(),
        })
}
