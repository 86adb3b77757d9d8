//! Nearest-neighbor sprite search over a perceptual-hash index.

use std::path::Path;

use anyhow::Result;
use image_hasher::ImageHash;

use crate::index::{compute_hash, load_or_build_index};

/// Hash `query_path` and return the `top_n` sprites closest to it by
/// Hamming distance, sorted `(distance, filename)` ascending.
pub fn search(
    query_path: &Path,
    sprites_dir: &Path,
    top_n: usize,
    force_rebuild: bool,
) -> Result<Vec<(String, u32)>> {
    let index = load_or_build_index(sprites_dir, force_rebuild)?;

    println!("Computing query hash...");
    let query_hash_str = compute_hash(query_path)?;
    let query_hash = ImageHash::from_base64(&query_hash_str)
        .map_err(|_| anyhow::anyhow!("failed to decode query hash"))?;

    println!("Searching for matches...");
    let mut results: Vec<(String, u32)> = Vec::new();
    for (hash_str, filenames) in &index.hashes {
        let Ok(candidate_hash) = ImageHash::from_base64(hash_str) else {
            continue;
        };
        let distance = query_hash.dist(&candidate_hash);
        for filename in filenames {
            results.push((filename.clone(), distance));
        }
    }

    results.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    results.truncate(top_n);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_sort_by_distance_then_filename() {
        let mut results = vec![
            ("z.png".to_string(), 3u32),
            ("a.png".to_string(), 1u32),
            ("b.png".to_string(), 1u32),
        ];
        results.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        assert_eq!(
            results,
            vec![
                ("a.png".to_string(), 1),
                ("b.png".to_string(), 1),
                ("z.png".to_string(), 3),
            ]
        );
    }
}
