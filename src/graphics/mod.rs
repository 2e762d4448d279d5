//! Sprite decoding and screen composition
//!
//! Sprites are decoded on demand from an unpacked [`Container`]; nothing is cached.

pub mod cga;
pub mod ega;
pub mod screen;
pub mod sprite;

pub use screen::{composite, composite_screen, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use sprite::{SpriteBitmap, SpriteDescriptor, SPRITE_HEADER_SIZE};

use tracing::debug;

use crate::colorspace::ColorSpace;
use crate::containers::Container;
use crate::error::{Result, SpriteError};
use crate::formats::toc::{SpriteName, TableOfContents};

/// Absolute offset of a sprite's header within the unpacked contents
pub fn sprite_header_offset(toc: &TableOfContents, name: &SpriteName) -> Result<usize> {
    let offset = toc
        .get(name)
        .ok_or_else(|| SpriteError::UnknownSprite(name.to_string()))?;
    Ok(toc.data_base_offset() + offset as usize)
}

/// Read the header of a sprite without decoding its pixels
pub fn read_descriptor(
    container: &Container,
    toc: &TableOfContents,
    name: &SpriteName,
) -> Result<SpriteDescriptor> {
    let offset = sprite_header_offset(toc, name)?;
    SpriteDescriptor::parse(container.contents(), offset)
}

/// Decode one sprite. `Ok(None)` means the sprite is 0x0 and has nothing to draw.
pub fn decode_sprite(
    container: &Container,
    toc: &TableOfContents,
    name: &SpriteName,
) -> Result<Option<SpriteBitmap>> {
    let header_offset = sprite_header_offset(toc, name)?;
    let descriptor = SpriteDescriptor::parse(container.contents(), header_offset)?;

    debug!("{}: {}", name, descriptor.reserved_hex());

    if descriptor.is_empty() {
        debug!("Empty sprite {}", name);
        return Ok(None);
    }

    let data = container.contents();
    let pixel_offset = header_offset + SPRITE_HEADER_SIZE;
    let color_space = container.color_space();
    let palette = color_space.palette();

    let image = match color_space {
        ColorSpace::Cga => cga::decode(data, pixel_offset, &descriptor, palette, name)?,
        ColorSpace::Ega => ega::decode(data, pixel_offset, &descriptor, palette, name)?,
    };

    Ok(Some(SpriteBitmap {
        name: name.clone(),
        descriptor,
        image,
    }))
}
