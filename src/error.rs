//! Error types for container loading, sprite decoding and export

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpriteError>;

#[derive(Debug, Error)]
pub enum SpriteError {
    /// File extension is neither a CGA nor an EGA sprite container
    #[error("Unsupported file type '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Input ended before the requested bytes could be read
    #[error("Truncated input while reading {context}: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The declared total length is smaller than the length field itself
    #[error("Invalid header: declared length {declared} is shorter than the header")]
    InvalidHeader { declared: u32 },

    /// A table of contents offset points past the unpacked contents
    #[error("Sprite offset beyond end of unpacked contents ({offset} > {unpacked_length})")]
    OffsetOutOfRange { offset: u32, unpacked_length: usize },

    #[error("No sprite named '{0}' in table of contents")]
    UnknownSprite(String),

    #[error("Malformed sprite name '{0}': expected two hex digits after \\x")]
    InvalidSpriteName(String),

    /// Pixel reads for a sprite run past the end of the buffer
    #[error("Pixel data of sprite '{sprite}' out of range: byte {index} requested, buffer is {len} bytes")]
    SpriteDataOutOfRange {
        sprite: String,
        index: usize,
        len: usize,
    },

    /// Member name does not fit the 13 byte ARC name field
    #[error("Archive member name '{0}' is longer than 12 bytes")]
    ArchiveName(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to serialise metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG optimisation failed: {0}")]
    PngOptimise(String),
}
