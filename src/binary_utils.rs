use std::io::{Cursor, Read};

use crate::error::{Result, SpriteError};

fn truncated(context: &'static str, offset: usize, needed: usize, available: usize) -> SpriteError {
    SpriteError::TruncatedInput {
        context,
        offset,
        needed,
        available,
    }
}

/// Read the next byte from a stream, failing instead of reading past the end
pub fn read_u8(cursor: &mut Cursor<&[u8]>, context: &'static str) -> Result<u8> {
    let position = cursor.position() as usize;
    let len = cursor.get_ref().len();
    if position >= len {
        return Err(truncated(context, position, 1, 0));
    }

    let mut buf = [0u8; 1];
    cursor.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32_le(cursor: &mut Cursor<&[u8]>, context: &'static str) -> Result<u32> {
    let position = cursor.position() as usize;
    let len = cursor.get_ref().len();
    if position + 4 > len {
        return Err(truncated(context, position, 4, len.saturating_sub(position)));
    }

    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Bytes left in the stream after the current position
pub fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor
        .get_ref()
        .len()
        .saturating_sub(cursor.position() as usize)
}

/// Borrow `length` bytes at `offset`
pub fn bytes_at<'a>(
    data: &'a [u8],
    offset: usize,
    length: usize,
    context: &'static str,
) -> Result<&'a [u8]> {
    offset
        .checked_add(length)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| truncated(context, offset, length, data.len().saturating_sub(offset)))
}

pub fn u16_at(data: &[u8], offset: usize, context: &'static str) -> Result<u16> {
    let bytes = bytes_at(data, offset, 2, context)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub fn u32_at(data: &[u8], offset: usize, context: &'static str) -> Result<u32> {
    let bytes = bytes_at(data, offset, 4, context)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
