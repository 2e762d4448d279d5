//! # Batch extraction
//!
//! Exports every sprite of every container found in a set of directories. Each file is handled
//! on its own: a broken file is reported and the rest of the batch carries on.

use std::{
    collections::HashMap,
    fs,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

use image::RgbaImage;
use oxipng::{InFile, OutFile};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use twox_hash::XxHash64;

use crate::colorspace::ColorSpace;
use crate::containers::Container;
use crate::error::{Result, SpriteError};
use crate::formats::toc::{SpriteName, TableOfContents};
use crate::graphics::{decode_sprite, read_descriptor, SpriteBitmap};

#[derive(Clone, Debug)]
pub struct ExtractOptions {
    pub output_dir: PathBuf,
    /// Run written PNGs through oxipng
    pub optimise_png: bool,
    /// Skip sprites renamed for a clashing name (`car_2`, ...) whose pixels and position match
    /// a sprite already written under that name from the same file
    pub skip_duplicates: bool,
    /// Write a `<FILE>.json` placement manifest next to the images
    pub write_manifest: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            output_dir: PathBuf::from("sprites"),
            optimise_png: false,
            skip_duplicates: false,
            write_manifest: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub sprites_written: usize,
    pub empty_sprites: usize,
    pub duplicates_skipped: usize,
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<FileSummary>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &FileSummary)> {
        self.files
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok().map(|s| (report.path.as_path(), s)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &SpriteError)> {
        self.files
            .iter()
            .filter_map(|report| report.outcome.as_ref().err().map(|e| (report.path.as_path(), e)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn sprites_written(&self) -> usize {
        self.succeeded().map(|(_, s)| s.sprites_written).sum()
    }
}

/// Per-sprite entry of the placement manifest
#[derive(Debug, Serialize)]
struct ManifestEntry {
    name: String,
    pos_x: u16,
    pos_y: u16,
    width: u32,
    height: u32,
    layer_info: u32,
    reserved: String,
}

/// Sprite containers directly inside `dirs`, sorted by path. Unreadable directories are skipped.
pub fn find_sprite_files(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory {}: {}", dir.display(), e);
                continue;
            }
        };

        files.extend(
            entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && ColorSpace::from_path(path).is_ok()),
        );
    }

    files.sort();
    files
}

/// Extract every file in parallel, collecting one report per file in input order
pub fn extract_files(paths: &[PathBuf], options: &ExtractOptions) -> BatchReport {
    let files = paths
        .par_iter()
        .map(|path| {
            info!("Processing {}", path.display());
            let outcome = extract_file(path, options);
            if let Err(e) = &outcome {
                warn!("Failed to extract {}: {}", path.display(), e);
            }
            FileReport {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    BatchReport { files }
}

pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<FileSummary> {
    let container = Container::open(path)?;
    let toc = TableOfContents::parse(&container)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    fs::create_dir_all(&options.output_dir)?;

    let mut summary = FileSummary::default();
    // Written sprites with their hashes, keyed by the name stored in the file
    let mut written: HashMap<&SpriteName, Vec<(u64, SpriteBitmap)>> = HashMap::new();

    for entry in &toc {
        let name = &entry.name;
        let Some(bitmap) = decode_sprite(&container, &toc, name)? else {
            info!("Empty sprite {}, not saving", name);
            summary.empty_sprites += 1;
            continue;
        };

        if options.skip_duplicates {
            let hash = bitmap_hash(&bitmap);
            let same_name = written
                .entry(entry.duplicate_of.as_ref().unwrap_or(name))
                .or_default();
            let original = same_name
                .iter()
                .find(|(h, b)| *h == hash && bitmaps_are_identical(b, &bitmap));
            if let (Some(_), Some((_, original))) = (&entry.duplicate_of, original) {
                debug!("Sprite {} duplicates {}, skipping", name, original.name);
                summary.duplicates_skipped += 1;
                continue;
            }
            same_name.push((hash, bitmap.clone()));
        }

        let output_path = sprite_output_path(&options.output_dir, &file_name, name);
        save_png(&bitmap.image, &output_path, options.optimise_png)?;
        summary.sprites_written += 1;
    }

    if options.write_manifest {
        let manifest_path = options.output_dir.join(format!("{}.json", file_name));
        save_manifest(&container, &toc, &manifest_path)?;
    }

    info!(
        "{}: {} sprites written, {} empty, {} duplicates skipped",
        file_name, summary.sprites_written, summary.empty_sprites, summary.duplicates_skipped
    );

    Ok(summary)
}

/// `<out>/<FILE>.<sprite>.png`, see [`SpriteName::file_stem`] for how the name is escaped
pub fn sprite_output_path(output_dir: &Path, file_name: &str, sprite: &SpriteName) -> PathBuf {
    output_dir.join(format!("{}.{}.png", file_name, sprite.file_stem()))
}

pub fn save_png(image: &RgbaImage, path: &Path, optimise: bool) -> Result<()> {
    image.save(path)?;

    if optimise {
        optimise_png(path)?;
    }

    Ok(())
}

/// Recompress a written PNG in place with oxipng
fn optimise_png(path: &Path) -> Result<()> {
    let mut options = oxipng::Options::from_preset(4);
    options.bit_depth_reduction = true;

    oxipng::optimize(
        &InFile::Path(path.to_path_buf()),
        &OutFile::Path(Some(path.to_path_buf())),
        &options,
    )
    .map_err(|e| SpriteError::PngOptimise(e.to_string()))
}

fn save_manifest(container: &Container, toc: &TableOfContents, path: &Path) -> Result<()> {
    let color_space = container.color_space();
    let mut manifest = Vec::with_capacity(toc.len());

    for name in toc.names() {
        let descriptor = read_descriptor(container, toc, name)?;
        manifest.push(ManifestEntry {
            name: name.to_string(),
            pos_x: descriptor.pos_x,
            pos_y: descriptor.pos_y,
            width: descriptor.pixel_width(color_space),
            height: descriptor.height as u32,
            layer_info: descriptor.layer_info,
            reserved: descriptor.reserved_hex(),
        });
    }

    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(path, json)?;
    Ok(())
}

/// 64-bit hash over placement and pixels, for fast duplicate lookup
fn bitmap_hash(bitmap: &SpriteBitmap) -> u64 {
    let mut hasher = XxHash64::default();
    bitmap.position().hash(&mut hasher);
    bitmap.image.dimensions().hash(&mut hasher);
    bitmap.image.as_raw().hash(&mut hasher);
    hasher.finish()
}

/// Confirms a hash match is not a collision
fn bitmaps_are_identical(a: &SpriteBitmap, b: &SpriteBitmap) -> bool {
    a.position() == b.position()
        && a.image.dimensions() == b.image.dimensions()
        && a.image.as_raw() == b.image.as_raw()
}
