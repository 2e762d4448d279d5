//! Screen composition: sprites drawn in list order onto a transparent canvas.
//! Later sprites overwrite earlier ones; nothing is blended.

use image::RgbaImage;
use tracing::debug;

use crate::containers::Container;
use crate::error::Result;
use crate::formats::toc::{SpriteName, TableOfContents};
use crate::graphics::{decode_sprite, SpriteBitmap};

pub const SCREEN_WIDTH: u32 = 320;
pub const SCREEN_HEIGHT: u32 = 200;

/// Composite onto a full 320x200 screen
pub fn composite_screen(
    container: &Container,
    toc: &TableOfContents,
    names: &[SpriteName],
) -> Result<RgbaImage> {
    composite(container, toc, names, SCREEN_WIDTH, SCREEN_HEIGHT)
}

pub fn composite(
    container: &Container,
    toc: &TableOfContents,
    names: &[SpriteName],
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::new(width, height);

    for name in names {
        match decode_sprite(container, toc, name)? {
            Some(bitmap) => blit(&mut canvas, &bitmap),
            None => debug!("Skipping empty sprite {}", name),
        }
    }

    Ok(canvas)
}

/// Copy a sprite onto the canvas at its stored position, dropping pixels that fall outside
fn blit(canvas: &mut RgbaImage, bitmap: &SpriteBitmap) {
    let (pos_x, pos_y) = bitmap.position();
    let mut clipped = 0usize;

    for (x, y, pixel) in bitmap.image.enumerate_pixels() {
        let canvas_x = pos_x + x;
        let canvas_y = pos_y + y;

        if canvas_x < canvas.width() && canvas_y < canvas.height() {
            canvas.put_pixel(canvas_x, canvas_y, *pixel);
        } else {
            clipped += 1;
        }
    }

    if clipped > 0 {
        debug!(
            "Sprite {} at ({}, {}) clipped: {} pixels outside the {}x{} canvas",
            bitmap.name,
            pos_x,
            pos_y,
            clipped,
            canvas.width(),
            canvas.height()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{ColorSpace, CGA_PALETTE};
    use crate::graphics::test_utils::{build_container, TestSprite};
    use image::Rgba;

    const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn names(list: &[&str]) -> Vec<SpriteName> {
        list.iter().map(|n| n.parse().unwrap()).collect()
    }

    fn overlapping_container() -> Container {
        build_container(
            &[
                // 8x2 all white at (0, 0)
                TestSprite {
                    name: b"back",
                    width: 2,
                    height: 2,
                    pos: (0, 0),
                    layer_info: 0,
                    pixels: &[0xFF; 4],
                },
                // 4x1 all cyan at (2, 1)
                TestSprite {
                    name: b"top\0",
                    width: 1,
                    height: 1,
                    pos: (2, 1),
                    layer_info: 0,
                    pixels: &[0x55],
                },
                TestSprite {
                    name: b"edge",
                    width: 1,
                    height: 2,
                    pos: (318, 199),
                    layer_info: 0,
                    pixels: &[0xAA, 0xAA],
                },
                TestSprite {
                    name: b"void",
                    width: 0,
                    height: 0,
                    pos: (0, 0),
                    layer_info: 0,
                    pixels: &[],
                },
            ],
            ColorSpace::Cga,
        )
    }

    #[test]
    fn test_later_sprite_wins_overlap() {
        let container = overlapping_container();
        let toc = TableOfContents::parse(&container).unwrap();

        let canvas = composite_screen(&container, &toc, &names(&["back", "top"])).unwrap();
        assert_eq!(canvas.dimensions(), (SCREEN_WIDTH, SCREEN_HEIGHT));

        let white = CGA_PALETTE[3];
        let cyan = CGA_PALETTE[1];
        assert_eq!(*canvas.get_pixel(0, 0), white);
        assert_eq!(*canvas.get_pixel(1, 1), white);
        for x in 2..6 {
            assert_eq!(*canvas.get_pixel(x, 1), cyan);
        }
        assert_eq!(*canvas.get_pixel(6, 1), white);
        assert_eq!(*canvas.get_pixel(8, 0), TRANSPARENT);
        assert_eq!(*canvas.get_pixel(2, 2), TRANSPARENT);

        // Reversed order: the background sprite covers the smaller one
        let canvas = composite_screen(&container, &toc, &names(&["top", "back"])).unwrap();
        assert_eq!(*canvas.get_pixel(3, 1), white);
    }

    #[test]
    fn test_sprites_past_edge_are_clipped() {
        let container = overlapping_container();
        let toc = TableOfContents::parse(&container).unwrap();

        let canvas = composite_screen(&container, &toc, &names(&["edge"])).unwrap();
        assert_eq!(*canvas.get_pixel(318, 199), CGA_PALETTE[2]);
        assert_eq!(*canvas.get_pixel(319, 199), CGA_PALETTE[2]);
        assert_eq!(*canvas.get_pixel(317, 199), TRANSPARENT);
    }

    #[test]
    fn test_empty_sprite_leaves_canvas_untouched() {
        let container = overlapping_container();
        let toc = TableOfContents::parse(&container).unwrap();

        let canvas = composite(&container, &toc, &names(&["void"]), 4, 4).unwrap();
        assert!(canvas.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_unknown_name_fails() {
        let container = overlapping_container();
        let toc = TableOfContents::parse(&container).unwrap();
        assert!(composite_screen(&container, &toc, &names(&["back", "gone"])).is_err());
    }
}
