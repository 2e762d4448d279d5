pub mod arc;
pub mod compression;

use std::{
    fs,
    io::Cursor,
    path::Path,
};

use tracing::debug;

use crate::binary_utils::read_u32_le;
use crate::colorspace::ColorSpace;
use crate::error::{Result, SpriteError};
use compression::{RunLengthUnpacker, StoredUnpacker};

/// Size of the total length field at the start of every container
pub const CONTAINER_HEADER_SIZE: usize = 4;

pub trait ContentUnpacker {
    /// Produce exactly `unpacked_length` bytes from the stream
    fn unpack(&self, cursor: &mut Cursor<&[u8]>, unpacked_length: usize) -> Result<Vec<u8>>;
}

/// Fully unpacked body of one sprite file
#[derive(Debug, Clone)]
pub struct Container {
    contents: Vec<u8>,
    color_space: ColorSpace,
}

impl Container {
    pub fn from_bytes(data: &[u8], color_space: ColorSpace) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let declared = read_u32_le(&mut cursor, "container header")?;
        // The declared length counts the length field itself
        let unpacked_length = (declared as usize)
            .checked_sub(CONTAINER_HEADER_SIZE)
            .ok_or(SpriteError::InvalidHeader { declared })?;

        let contents = if color_space.is_run_length_packed() {
            RunLengthUnpacker::default().unpack(&mut cursor, unpacked_length)?
        } else {
            StoredUnpacker.unpack(&mut cursor, unpacked_length)?
        };

        debug!(
            "Unpacked {} bytes of {:?} data from {} input bytes",
            contents.len(),
            color_space,
            cursor.position()
        );

        Ok(Container {
            contents,
            color_space,
        })
    }

    /// Read a container from disk, picking the colour space from the file extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let color_space = ColorSpace::from_path(path)?;
        let data = fs::read(path)?;
        Self::from_bytes(&data, color_space)
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn unpacked_length(&self) -> usize {
        self.contents.len()
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Write the unpacked body to `path`
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(body: &[u8], unpacked: u32) -> Vec<u8> {
        let mut data = (unpacked + 4).to_le_bytes().to_vec();
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_cga_container_is_run_length_unpacked() {
        let data = with_header(&[0x01, 0x83, 0xAA, 0x03, 0x02], 5);
        let container = Container::from_bytes(&data, ColorSpace::Cga).unwrap();

        assert_eq!(container.contents(), &[0x01, 0xAA, 0xAA, 0xAA, 0x02]);
        assert_eq!(container.unpacked_length(), 5);
        assert_eq!(container.color_space(), ColorSpace::Cga);
    }

    #[test]
    fn test_ega_container_is_copied_verbatim() {
        // 0x83 carries no meaning in stored containers
        let data = with_header(&[0x83, 0x01, 0x05, 0x09], 4);
        let container = Container::from_bytes(&data, ColorSpace::Ega).unwrap();

        assert_eq!(container.contents(), &[0x83, 0x01, 0x05, 0x09]);
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let data = with_header(&[1, 2, 3, 4, 5, 6], 3);
        let container = Container::from_bytes(&data, ColorSpace::Ega).unwrap();
        assert_eq!(container.contents(), &[1, 2, 3]);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            Container::from_bytes(&[0x10, 0x00], ColorSpace::Cga),
            Err(SpriteError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_declared_length_below_header_size() {
        assert!(matches!(
            Container::from_bytes(&[0x02, 0x00, 0x00, 0x00], ColorSpace::Ega),
            Err(SpriteError::InvalidHeader { declared: 2 })
        ));
    }

    #[test]
    fn test_maximum_declared_length_with_tiny_body() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x83, 0x00, 0x10];
        assert!(matches!(
            Container::from_bytes(&data, ColorSpace::Cga),
            Err(SpriteError::TruncatedInput { .. })
        ));
        assert!(matches!(
            Container::from_bytes(&data, ColorSpace::Ega),
            Err(SpriteError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_short_body() {
        let data = with_header(&[1, 2], 8);
        assert!(matches!(
            Container::from_bytes(&data, ColorSpace::Ega),
            Err(SpriteError::TruncatedInput { .. })
        ));
        assert!(matches!(
            Container::from_bytes(&data, ColorSpace::Cga),
            Err(SpriteError::TruncatedInput { .. })
        ));
    }
}
