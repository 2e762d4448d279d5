//! # ARC repackaging
//!
//! The EGA sprite files ship as `.PES` members with a 16 byte header of their own. Rewriting
//! those headers as SEA-ARC member headers lets a stock ARC extractor produce the `.EMP` files.
//!
//! PES header layout:
//!
//! | bytes | field |
//! |---|---|
//! | 4-7 | compressed size |
//! | 8-11 | uncompressed size |
//! | 12 | compression type |
//! | 14-15 | CRC |

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::binary_utils::{bytes_at, u32_at};
use crate::error::{Result, SpriteError};

pub const ARC_MARKER: u8 = 0x1A;
pub const PES_HEADER_SIZE: usize = 16;
/// 12 name bytes plus the C string terminator
const ARC_NAME_FIELD_SIZE: usize = 13;
const ARC_DATE: [u8; 2] = [0xA8, 0x3C];
const ARC_TIME: [u8; 2] = [0x0B, 0x75];

#[derive(Debug, Clone)]
pub struct ArcMember {
    pub name: String,
    pub compression_type: u8,
    pub crc: [u8; 2],
    pub uncompressed_size: u32,
    pub payload: Vec<u8>,
}

impl ArcMember {
    /// Lift the payload and header fields out of a `.PES` file
    pub fn from_pes(name: &str, data: &[u8]) -> Result<Self> {
        if name.len() >= ARC_NAME_FIELD_SIZE {
            return Err(SpriteError::ArchiveName(name.to_string()));
        }

        let header = bytes_at(data, 0, PES_HEADER_SIZE, "PES header")?;
        let compressed_size = u32_at(header, 0x04, "PES header")?;
        let uncompressed_size = u32_at(header, 0x08, "PES header")?;
        let payload = bytes_at(data, PES_HEADER_SIZE, compressed_size as usize, "PES payload")?;

        Ok(ArcMember {
            name: name.to_string(),
            compression_type: header[0x0C],
            crc: [header[0x0E], header[0x0F]],
            uncompressed_size,
            payload: payload.to_vec(),
        })
    }

    fn write_to(&self, output: &mut Vec<u8>) {
        output.push(ARC_MARKER);
        output.push(self.compression_type);

        let mut name_field = [0u8; ARC_NAME_FIELD_SIZE];
        name_field[..self.name.len()].copy_from_slice(self.name.as_bytes());
        output.extend_from_slice(&name_field);

        output.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        output.extend_from_slice(&ARC_DATE);
        output.extend_from_slice(&ARC_TIME);
        output.extend_from_slice(&self.crc);
        output.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        output.extend_from_slice(&self.payload);
    }
}

#[derive(Debug, Default)]
pub struct ArcArchive {
    members: Vec<ArcMember>,
}

impl ArcArchive {
    /// Collect every `.PES` file in `dir`, in file name order, as `<BASENAME>.EMP` members
    pub fn from_pes_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("PES"))
            })
            .collect();
        paths.sort();

        let mut archive = ArcArchive::default();
        for path in paths {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = format!("{}.EMP", stem);

            info!("Packing {} as {}", path.display(), name);
            let data = fs::read(&path)?;
            archive.append(ArcMember::from_pes(&name, &data)?);
        }

        Ok(archive)
    }

    pub fn append(&mut self, member: ArcMember) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::new();
        for member in &self.members {
            member.write_to(&mut output);
        }

        // End of archive: marker followed by "no further member"
        output.push(ARC_MARKER);
        output.push(0x00);
        output
    }
}
