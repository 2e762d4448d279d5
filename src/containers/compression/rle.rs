use std::io::Cursor;

use tracing::warn;

use crate::binary_utils::{read_u8, remaining};
use crate::containers::ContentUnpacker;
use crate::error::Result;

// Run-length packing used by CGA containers.
// A literal byte is copied as-is; the escape byte is followed by (value, count)
// and expands to `count` copies of `value`.

// Most output a single input byte can produce: a 3 byte escape yields at most 255
const MAX_EXPANSION: usize = 85;

pub const RLE_ESCAPE: u8 = 0x83;

#[derive(Debug, Clone, Copy)]
pub struct RunLengthUnpacker {
    pub escape: u8,
}

impl Default for RunLengthUnpacker {
    fn default() -> Self {
        RunLengthUnpacker { escape: RLE_ESCAPE }
    }
}

impl ContentUnpacker for RunLengthUnpacker {
    fn unpack(&self, cursor: &mut Cursor<&[u8]>, unpacked_length: usize) -> Result<Vec<u8>> {
        // The declared length is untrusted; reserve only what the input could expand to
        let mut unpacked = Vec::with_capacity(
            unpacked_length.min(remaining(cursor).saturating_mul(MAX_EXPANSION)),
        );

        // Every token consumes input, so running out of input ends the loop with an error
        while unpacked.len() < unpacked_length {
            let byte = read_u8(cursor, "run-length data")?;

            if byte != self.escape {
                unpacked.push(byte);
                continue;
            }

            let value = read_u8(cursor, "run-length value")?;
            let count = read_u8(cursor, "run-length count")? as usize;

            let room = unpacked_length - unpacked.len();
            if count > room {
                warn!(
                    "Run of {} bytes at input offset {} overshoots unpacked length by {}, cutting it",
                    count,
                    cursor.position(),
                    count - room
                );
            }
            unpacked.resize(unpacked.len() + count.min(room), value);
        }

        Ok(unpacked)
    }
}
