mod rle;

pub use rle::{RunLengthUnpacker, RLE_ESCAPE};

use std::io::{Cursor, Read};

use crate::binary_utils::remaining;
use crate::containers::ContentUnpacker;
use crate::error::{Result, SpriteError};

/// Body stored without compression, copied 1:1
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredUnpacker;

impl ContentUnpacker for StoredUnpacker {
    fn unpack(&self, cursor: &mut Cursor<&[u8]>, unpacked_length: usize) -> Result<Vec<u8>> {
        let available = remaining(cursor);
        if available < unpacked_length {
            return Err(SpriteError::TruncatedInput {
                context: "stored contents",
                offset: cursor.position() as usize,
                needed: unpacked_length,
                available,
            });
        }

        let mut contents = vec![0u8; unpacked_length];
        cursor.read_exact(&mut contents)?;
        Ok(contents)
    }
}
