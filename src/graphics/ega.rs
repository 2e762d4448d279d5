//! # EGA sprites
//!
//! Pixel data is four 1 bit planes stored back to back, each `width * height / 8` bytes.
//! Which plane feeds which bit of the colour index, the byte order of each plane and a
//! background colour are all packed into the sprite's `layer_info` word.

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::formats::toc::SpriteName;
use crate::graphics::sprite::{ensure_pixel_data, pixel_byte, SpriteDescriptor};

pub const EGA_PLANES: usize = 4;
pub const EGA_PIXELS_PER_BYTE: u32 = 8;

const DIRECTION_SHIFT: u32 = 20;
const BACKGROUND_SHIFT: u32 = 12;

/// Per-sprite plane control word
///
/// ```text
/// 0xf0000000  unused
/// 0x0f000000  colour bit(s) on plane 3
/// 0x00f00000  planes stored column by column (bit n = plane n)
/// 0x000f0000  colour bit(s) on plane 2
/// 0x0000f000  background colour, XORed into every index
/// 0x00000f00  colour bit(s) on plane 1
/// 0x000000f0  unused
/// 0x0000000f  colour bit(s) on plane 0
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerInfo(pub u32);

impl LayerInfo {
    /// Plane holding colour bit `bit`. When several planes claim it the highest one wins.
    pub fn plane_for_colour_bit(&self, bit: u32) -> Option<usize> {
        let mask = 1u32 << bit;
        (0..EGA_PLANES)
            .rev()
            .find(|&plane| (self.0 >> (8 * plane)) & mask == mask)
    }

    pub fn is_column_major(&self, plane: usize) -> bool {
        self.0 & (1 << (DIRECTION_SHIFT as usize + plane)) != 0
    }

    pub fn background(&self) -> u8 {
        ((self.0 >> BACKGROUND_SHIFT) & 0xF) as u8
    }
}

pub fn decode(
    data: &[u8],
    pixel_offset: usize,
    descriptor: &SpriteDescriptor,
    palette: &[Rgba<u8>],
    name: &SpriteName,
) -> Result<RgbaImage> {
    let layer_info = LayerInfo(descriptor.layer_info);
    let bytes_per_row = descriptor.width as usize;
    let width = descriptor.width as u32 * EGA_PIXELS_PER_BYTE;
    let height = descriptor.height as u32;
    let background = layer_info.background();

    // Resolved once per sprite: source plane and its byte order for colour bits 3..0
    let sources: Vec<Option<(usize, bool)>> = (0..EGA_PLANES as u32)
        .rev()
        .map(|bit| {
            layer_info
                .plane_for_colour_bit(bit)
                .map(|plane| (plane, layer_info.is_column_major(plane)))
        })
        .collect();

    // Planes up to the highest one referenced must be present; with none referenced, one plane
    let planes_read = sources
        .iter()
        .flatten()
        .map(|&(plane, _)| plane + 1)
        .max()
        .unwrap_or(1);
    let plane_size = bytes_per_row.checked_mul(height as usize);
    ensure_pixel_data(
        data,
        pixel_offset,
        plane_size.and_then(|size| size.checked_mul(planes_read)),
        name,
    )?;
    let plane_size = plane_size.unwrap_or_default();

    let mut image = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let column = (x / EGA_PIXELS_PER_BYTE) as usize;
            let shift = 7 - x % EGA_PIXELS_PER_BYTE;

            let mut index = 0u8;
            for source in &sources {
                index <<= 1;
                let Some((plane, column_major)) = *source else {
                    continue;
                };

                let within_plane = if column_major {
                    column * height as usize + y as usize
                } else {
                    column + y as usize * bytes_per_row
                };
                let byte = pixel_byte(data, pixel_offset + plane * plane_size + within_plane, name)?;
                index |= (byte >> shift) & 1;
            }

            image.put_pixel(x, y, palette[(background ^ index) as usize]);
        }
    }

    Ok(image)
}
