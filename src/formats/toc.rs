//! # Table of contents
//!
//! Every unpacked container starts with a sprite index:
//!
//! | offset | field |
//! |---|---|
//! | 0 | sprite count `N` (u16) |
//! | 2 | `N` names, 4 bytes each, NUL padded |
//! | 2 + 4N | `N` offsets (u32), relative to the sprite data at `2 + 8N` |

use std::fmt;
use std::str::FromStr;

use crate::binary_utils::{bytes_at, u16_at, u32_at};
use crate::containers::Container;
use crate::error::{Result, SpriteError};

pub const SPRITE_NAME_SIZE: usize = 4;
const TOC_COUNT_SIZE: usize = 2;

/// Printable bytes that cannot appear in a file name on common filesystems, plus the escape marker
const FILE_NAME_RESERVED: &[u8] = b"/\\:*?\"<>|%";

/// Raw sprite tag. Not guaranteed to be printable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteName(Vec<u8>);

impl SpriteName {
    /// Build a name from its raw field, dropping NUL padding
    pub fn from_raw(raw: &[u8]) -> Self {
        SpriteName(raw.iter().copied().filter(|&b| b != 0).collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Form usable as part of a file name. Every byte that is unprintable or reserved
    /// in file names becomes `%NN`, so distinct names always give distinct file names.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        for &b in &self.0 {
            if b.is_ascii_graphic() && !FILE_NAME_RESERVED.contains(&b) {
                stem.push(b as char);
            } else {
                stem.push_str(&format!("%{:02x}", b));
            }
        }
        stem
    }

    fn with_suffix(&self, suffix: &str) -> Self {
        let mut bytes = self.0.clone();
        bytes.extend_from_slice(suffix.as_bytes());
        SpriteName(bytes)
    }
}

impl fmt::Display for SpriteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() && b != b'\\' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Parses the `Display` form back, so `\xNN` escapes round-trip
impl FromStr for SpriteName {
    type Err = SpriteError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let mut name = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
                let hex = s
                    .get(i + 2..i + 4)
                    .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| SpriteError::InvalidSpriteName(s.to_string()))?;
                name.push(hex);
                i += 4;
            } else {
                name.push(bytes[i]);
                i += 1;
            }
        }
        Ok(SpriteName(name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub name: SpriteName,
    /// Relative to [`TableOfContents::data_base_offset`]
    pub offset: u32,
    /// Name as stored in the file when it clashed with an earlier entry and was renamed
    pub duplicate_of: Option<SpriteName>,
}

/// Sprite index in file order. Order matters: the data base offset is derived from the entry count.
#[derive(Clone, Debug, Default)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn parse(container: &Container) -> Result<Self> {
        let contents = container.contents();
        let unpacked_length = container.unpacked_length();

        let count = u16_at(contents, 0, "sprite count")? as usize;
        let offsets_start = TOC_COUNT_SIZE + SPRITE_NAME_SIZE * count;

        let mut toc = TableOfContents {
            entries: Vec::with_capacity(count),
        };

        for i in 0..count {
            let raw_name = bytes_at(
                contents,
                TOC_COUNT_SIZE + SPRITE_NAME_SIZE * i,
                SPRITE_NAME_SIZE,
                "sprite name",
            )?;
            let offset = u32_at(contents, offsets_start + 4 * i, "sprite offset")?;

            if offset as usize > unpacked_length {
                return Err(SpriteError::OffsetOutOfRange {
                    offset,
                    unpacked_length,
                });
            }

            toc.insert(SpriteName::from_raw(raw_name), offset);
        }

        Ok(toc)
    }

    /// Append an entry. A name already present is stored as `name_2` (then `name_3`, ...)
    /// so the first entry keeps its offset.
    fn insert(&mut self, name: SpriteName, offset: u32) {
        let mut key = name.clone();
        let mut n = 2;
        while self.get(&key).is_some() {
            key = name.with_suffix(&format!("_{}", n));
            n += 1;
        }
        let duplicate_of = (key != name).then_some(name);
        self.entries.push(TocEntry {
            name: key,
            offset,
            duplicate_of,
        });
    }

    pub fn get(&self, name: &SpriteName) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| &entry.name == name)
            .map(|entry| entry.offset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TocEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &SpriteName> {
        self.entries.iter().map(|entry| &entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start of the sprite data region the entry offsets are relative to
    pub fn data_base_offset(&self) -> usize {
        TOC_COUNT_SIZE + 2 * SPRITE_NAME_SIZE * self.entries.len()
    }
}

impl<'a> IntoIterator for &'a TableOfContents {
    type Item = &'a TocEntry;
    type IntoIter = std::slice::Iter<'a, TocEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
