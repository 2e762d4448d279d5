//! CGA sprites: 4 pixels per byte, 2 bits each, most significant pair first, rows stored
//! one after another without interlacing.

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::formats::toc::SpriteName;
use crate::graphics::sprite::{ensure_pixel_data, pixel_byte, SpriteDescriptor};

pub const CGA_PIXELS_PER_BYTE: u32 = 4;

pub fn decode(
    data: &[u8],
    pixel_offset: usize,
    descriptor: &SpriteDescriptor,
    palette: &[Rgba<u8>],
    name: &SpriteName,
) -> Result<RgbaImage> {
    let bytes_per_row = descriptor.width as usize;
    let width = descriptor.width as u32 * CGA_PIXELS_PER_BYTE;
    let height = descriptor.height as u32;

    ensure_pixel_data(
        data,
        pixel_offset,
        bytes_per_row.checked_mul(height as usize),
        name,
    )?;

    let mut image = RgbaImage::new(width, height);
    for y in 0..height {
        let row_start = pixel_offset + y as usize * bytes_per_row;
        for x in 0..width {
            let byte = pixel_byte(data, row_start + (x / CGA_PIXELS_PER_BYTE) as usize, name)?;
            let shift = 2 * (3 - x % CGA_PIXELS_PER_BYTE);
            let index = (byte >> shift) & 0b11;
            image.put_pixel(x, y, palette[index as usize]);
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::CGA_PALETTE;
    use crate::error::SpriteError;

    fn descriptor(width: u16, height: u16) -> SpriteDescriptor {
        SpriteDescriptor {
            width,
            height,
            pos_x: 0,
            pos_y: 0,
            layer_info: 0,
            reserved: [0; 12],
        }
    }

    #[test]
    fn test_high_bits_are_leftmost_pixel() {
        let name = SpriteName::from_raw(b"t");
        let image = decode(&[0b10_00_00_00], 0, &descriptor(1, 1), &CGA_PALETTE, &name).unwrap();

        let magenta = Rgba([255, 0, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        assert_eq!(image.dimensions(), (4, 1));
        assert_eq!(*image.get_pixel(0, 0), magenta);
        assert_eq!(*image.get_pixel(1, 0), black);
        assert_eq!(*image.get_pixel(3, 0), black);
    }

    #[test]
    fn test_rows_follow_each_other() {
        // 8x2: row 0 = [0,1,2,3, 3,3,3,3], row 1 = [1,1,1,1, 0,0,0,0]
        let data = [0xAA, 0b00_01_10_11, 0xFF, 0x55, 0x00];
        let name = SpriteName::from_raw(b"t");
        let image = decode(&data, 1, &descriptor(2, 2), &CGA_PALETTE, &name).unwrap();

        assert_eq!(image.dimensions(), (8, 2));
        for x in 0..4 {
            assert_eq!(*image.get_pixel(x, 0), CGA_PALETTE[x as usize]);
        }
        assert_eq!(*image.get_pixel(5, 0), CGA_PALETTE[3]);
        assert_eq!(*image.get_pixel(2, 1), CGA_PALETTE[1]);
        assert_eq!(*image.get_pixel(7, 1), CGA_PALETTE[0]);
    }

    #[test]
    fn test_oversized_header_fails_before_allocating() {
        let name = SpriteName::from_raw(b"big");
        assert!(matches!(
            decode(&[0u8; 64], 16, &descriptor(0xFFFF, 0xFFFF), &CGA_PALETTE, &name),
            Err(SpriteError::SpriteDataOutOfRange { len: 64, .. })
        ));
    }

    #[test]
    fn test_pixel_data_past_buffer() {
        let name = SpriteName::from_raw(b"t");
        assert!(matches!(
            decode(&[0x00, 0x00], 0, &descriptor(1, 3), &CGA_PALETTE, &name),
            Err(SpriteError::SpriteDataOutOfRange { index: 2, .. })
        ));
    }
}
