//! Perceptual-hash index over a sprites directory.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use image_hasher::HasherConfig;
use serde::{Deserialize, Serialize};

pub const INDEX_FILENAME: &str = ".sprite-index.json";
pub const INDEX_VERSION: u32 = 4;

#[derive(Debug, Serialize, Deserialize)]
pub struct HashIndex {
    pub version: u32,
    pub hashes: HashMap<String, Vec<String>>,
}

/// Compute a perceptual hash for an image, base64-encoded for storage.
pub fn compute_hash(image_path: &Path) -> Result<String> {
    let img = image::open(image_path)
        .with_context(|| format!("failed to open image {}", image_path.display()))?;
    let hasher = HasherConfig::new().to_hasher();
    Ok(hasher.hash_image(&img).to_base64())
}

fn png_files(sprites_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(sprites_dir)
        .with_context(|| format!("failed to read directory {}", sprites_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("png") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Build a fresh hash index for every PNG in `sprites_dir` and persist
/// it to [`INDEX_FILENAME`] inside that directory.
pub fn build_index(sprites_dir: &Path) -> Result<HashIndex> {
    let files = png_files(sprites_dir)?;
    let total = files.len();
    println!("Building index for {total} sprites...");

    let mut hashes: HashMap<String, Vec<String>> = HashMap::new();
    for (i, path) in files.iter().enumerate() {
        if (i + 1) % 1000 == 0 || i + 1 == total {
            print!("  Indexed {}/{total} sprites...\r", i + 1);
        }
        let Ok(hash) = compute_hash(path) else {
            continue;
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        hashes.entry(hash).or_default().push(name);
    }
    println!();

    let index = HashIndex {
        version: INDEX_VERSION,
        hashes,
    };

    let index_path = sprites_dir.join(INDEX_FILENAME);
    let serialized = serde_json::to_string(&index)?;
    fs::write(&index_path, serialized)
        .with_context(|| format!("failed to write index to {}", index_path.display()))?;

    println!("Index saved: {} unique hashes", index.hashes.len());
    Ok(index)
}

/// Load the persisted index, rebuilding it when forced, missing,
/// stale (any PNG newer than the index file), or written by an older
/// format version.
pub fn load_or_build_index(sprites_dir: &Path, force_rebuild: bool) -> Result<HashIndex> {
    let index_path = sprites_dir.join(INDEX_FILENAME);

    if force_rebuild {
        println!("Forcing index rebuild...");
        return build_index(sprites_dir);
    }

    if !index_path.is_file() {
        println!("No index found, building...");
        return build_index(sprites_dir);
    }

    let index_mtime = fs::metadata(&index_path)?.modified()?;
    let newest_sprite = png_files(sprites_dir)?
        .iter()
        .filter_map(|p| fs::metadata(p).and_then(|m| m.modified()).ok())
        .max()
        .unwrap_or(SystemTime::UNIX_EPOCH);

    if newest_sprite > index_mtime {
        println!("Index is stale, rebuilding...");
        return build_index(sprites_dir);
    }

    let raw = fs::read_to_string(&index_path)?;
    let index: HashIndex = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse index {}", index_path.display()))?;

    if index.version != INDEX_VERSION {
        println!("Index version mismatch, rebuilding...");
        return build_index(sprites_dir);
    }

    println!("Loaded existing index ({} unique hashes)", index.hashes.len());
    Ok(index)
}
