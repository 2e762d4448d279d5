//! Decoder for the packed sprite containers of a DOS racing game.
//!
//! `.CMP` files hold run-length packed CGA sprites, `.EMP` files stored EGA sprites. Both share
//! one layout: a length header, a table of contents and a 16 byte header per sprite.
//!
//! ```no_run
//! use testdrive_sprites::{composite_screen, decode_sprite, Container, TableOfContents};
//!
//! let container = Container::open("testdrive/P911TSB.CMP")?;
//! let toc = TableOfContents::parse(&container)?;
//! let names: Vec<_> = toc.names().cloned().collect();
//!
//! if let Some(bitmap) = decode_sprite(&container, &toc, &names[0])? {
//!     bitmap.image.save("first.png")?;
//! }
//! let screen = composite_screen(&container, &toc, &names)?;
//! screen.save("screen.png")?;
//! # Ok::<(), testdrive_sprites::SpriteError>(())
//! ```

pub mod binary_utils;
pub mod colorspace;
pub mod containers;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod graphics;

pub use colorspace::ColorSpace;
pub use containers::Container;
pub use error::{Result, SpriteError};
pub use formats::toc::{SpriteName, TableOfContents};
pub use graphics::{composite_screen, decode_sprite, SpriteBitmap, SpriteDescriptor};

/// Unpack a container from raw file bytes
pub fn load_container(bytes: &[u8], color_space: ColorSpace) -> Result<Container> {
    Container::from_bytes(bytes, color_space)
}

pub fn parse_table_of_contents(container: &Container) -> Result<TableOfContents> {
    TableOfContents::parse(container)
}
