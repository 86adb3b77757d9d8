//! Top-level sprite extraction: walks atlas descriptors, decodes their
//! backing textures, crops each sprite frame, and writes PNGs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use image::RgbaImage;

use crate::atlas::{AtlasDescriptor, FrameInfo};
use crate::blob;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::pack::{self, PackEntry};
use crate::texture::TextureContainer;

/// Summary of one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub extracted: usize,
    pub failed: usize,
}

/// Extract every sprite reachable from a `.mpkinfo` directory index
/// into `output_dir` as PNGs.
///
/// `progress` is called once per atlas descriptor with `(current,
/// total)`, letting the caller drive a progress bar without this crate
/// depending on one.
pub fn extract_sprites(
    mpkinfo_path: &Path,
    output_dir: &Path,
    mut progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<ExtractSummary> {
    let entries = pack::read_index(mpkinfo_path)?;
    let pack_files = pack::find_pack_files(mpkinfo_path);

    let catalog_entry = entries
        .iter()
        .find(|e| e.name.to_lowercase().contains("resource.repository"))
        .ok_or(Error::MissingCatalogEntry)?;
    let catalog_bytes = read_entry_blob(catalog_entry, &pack_files)?;
    let catalog_bytes = blob::decompress_envelope(&catalog_bytes);
    let catalog = Catalog::parse(&catalog_bytes);

    let plist_entries: Vec<&PackEntry> = entries
        .iter()
        .filter(|e| e.name.ends_with(".plist"))
        .collect();

    fs::create_dir_all(output_dir)?;

    let mut texture_cache: HashMap<String, Option<RgbaImage>> = HashMap::new();
    let mut name_counts: HashMap<String, usize> = HashMap::new();
    let mut summary = ExtractSummary::default();

    let total = plist_entries.len();
    for (index, plist_entry) in plist_entries.into_iter().enumerate() {
        if let Some(cb) = progress.as_deref_mut() {
            cb(index, total);
        }

        let descriptor = match read_entry_blob(plist_entry, &pack_files)
            .map(|raw| blob::decompress_if_zzz4(&raw))
            .and_then(|bytes| AtlasDescriptor::parse(&bytes))
        {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => continue,
            Err(_) => {
                summary.failed += 1;
                continue;
            }
        };

        let atlas_image = resolve_texture(
            &descriptor.texture_filename,
            &catalog,
            &entries,
            &pack_files,
            &mut texture_cache,
        );

        let Some(atlas_image) = atlas_image else {
            summary.failed += descriptor.frames.len();
            continue;
        };

        for (name, frame) in &descriptor.frames {
            match crop_frame(&atlas_image, frame) {
                Ok(sprite) => {
                    let filename = dedup_filename(name, &mut name_counts);
                    match sprite.save(output_dir.join(&filename)) {
                        Ok(()) => summary.extracted += 1,
                        Err(_) => summary.failed += 1,
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }
    }

    if let Some(cb) = progress.as_deref_mut() {
        cb(total, total);
    }

    Ok(summary)
}

fn read_entry_blob(entry: &PackEntry, pack_files: &[std::path::PathBuf]) -> Result<Vec<u8>> {
    let pack_path = pack_files
        .get(entry.pack_index as usize)
        .ok_or(Error::PackIndexOutOfRange(entry.pack_index))?;
    blob::read_blob(pack_path, entry.offset, entry.length)
}

/// Resolve (and cache) the decoded atlas texture for `texture_filename`.
///
/// Looks up the negative cache first; a `None` cached value means a
/// prior descriptor already failed to decode this texture and it is
/// not retried.
fn resolve_texture(
    texture_filename: &str,
    catalog: &Catalog,
    entries: &[PackEntry],
    pack_files: &[std::path::PathBuf],
    cache: &mut HashMap<String, Option<RgbaImage>>,
) -> Option<RgbaImage> {
    if let Some(cached) = cache.get(texture_filename) {
        return cached.clone();
    }

    let image = load_texture(texture_filename, catalog, entries, pack_files);
    cache.insert(texture_filename.to_string(), image.clone());
    image
}

fn load_texture(
    texture_filename: &str,
    catalog: &Catalog,
    entries: &[PackEntry],
    pack_files: &[std::path::PathBuf],
) -> Option<RgbaImage> {
    let stem = texture_filename.strip_suffix(".png").unwrap_or(texture_filename);

    let guid_path = catalog
        .find_by_name(stem, false)
        .into_iter()
        .find(|record| catalog.resolve(record).resource_type == "Texture2D")
        .map(|record| record.guid_path())?;

    let pack_entry = entries
        .iter()
        .find(|e| e.name.contains(&guid_path) || e.name.ends_with(&guid_path))?;

    let raw = read_entry_blob(pack_entry, pack_files).ok()?;
    let decompressed = blob::decompress_if_zzz4(&raw);
    let container = TextureContainer::parse(decompressed).ok()?;
    let pixels = container.decode(None).ok()?;

    let slice = container.slice_header(container.largest_slice_index())?;
    RgbaImage::from_raw(slice.width as u32, slice.height as u32, pixels)
}

/// Crop one sprite frame out of a decoded atlas, rotating 90°
/// counter-clockwise for frames marked `rotated`.
fn crop_frame(atlas: &RgbaImage, frame: &FrameInfo) -> Result<RgbaImage> {
    let (x, y, w, h) = frame.frame_rect;
    if w <= 0 || h <= 0 || x < 0 || y < 0 {
        return Err(Error::FrameOutOfBounds);
    }
    let (x, y, w, h) = (x as u32, y as u32, w as u32, h as u32);

    if frame.rotated {
        let (crop_w, crop_h) = (h, w);
        if x + crop_w > atlas.width() || y + crop_h > atlas.height() {
            return Err(Error::FrameOutOfBounds);
        }
        let cropped = image::imageops::crop_imm(atlas, x, y, crop_w, crop_h).to_image();
        let rotated = image::imageops::rotate270(&cropped);
        Ok(rotated)
    } else {
        if x + w > atlas.width() || y + h > atlas.height() {
            return Err(Error::FrameOutOfBounds);
        }
        Ok(image::imageops::crop_imm(atlas, x, y, w, h).to_image())
    }
}

/// Strip an extension to get the base name and apply the run's
/// de-duplication counter: first sighting -> `base.png`, Nth (N >= 2)
/// -> `base_{N-1}.png`.
fn dedup_filename(sprite_key: &str, counts: &mut HashMap<String, usize>) -> String {
    let base = sprite_key
        .rsplit_once('.')
        .map(|(base, _ext)| base)
        .unwrap_or(sprite_key);

    let count = counts.entry(base.to_string()).or_insert(0);
    *count += 1;

    if *count == 1 {
        format!("{base}.png")
    } else {
        format!("{base}_{}.png", *count - 1)
    }
}
