//! `.mpkinfo` directory index parsing and sibling `.mpk` pack file
//! enumeration.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// One record in the pack index: a logical name bound to a byte range
/// in one of the sibling `.mpk` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub name: String,
    pub offset: u32,
    pub length: u32,
    pub pack_index: u32,
}

/// Parse a `.mpkinfo` file into its ordered list of entries.
///
/// Zero-length entries are dropped at parse time (spec invariant).
/// A truncated entry ends parsing at the last fully-read entry rather
/// than failing the whole read — only a missing index file is fatal.
pub fn read_index<P: AsRef<Path>>(path: P) -> Result<Vec<PackEntry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| Error::MissingIndex(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);

    let mut entries = Vec::new();

    let mut header = [0u8; 4];
    if reader.read_exact(&mut header).is_err() {
        return Ok(entries);
    }

    let Ok(count) = reader.read_u32::<LittleEndian>() else {
        return Ok(entries);
    };

    for _ in 0..count {
        match read_one_entry(&mut reader) {
            Some(entry) => {
                if entry.length > 0 {
                    entries.push(entry);
                }
            }
            None => break,
        }
    }

    Ok(entries)
}

fn read_one_entry<R: Read>(reader: &mut R) -> Option<PackEntry> {
    let name_len = reader.read_u16::<LittleEndian>().ok()? as usize;
    let mut name_bytes = vec![0u8; name_len];
    reader.read_exact(&mut name_bytes).ok()?;
    let name = String::from_utf8_lossy(&name_bytes).into_owned();

    let offset = reader.read_u32::<LittleEndian>().ok()?;
    let length = reader.read_u32::<LittleEndian>().ok()?;
    let raw_pack_index = reader.read_u32::<LittleEndian>().ok()?;

    Some(PackEntry {
        name,
        offset,
        length,
        pack_index: raw_pack_index / 2,
    })
}

/// Discover the sibling `.mpk` files for a `.mpkinfo` path.
///
/// Probes `<stem>.mpk`, `<stem>1.mpk`, `<stem>2.mpk`, … and stops at
/// the first missing numbered suffix. A case-insensitive `resource*`
/// stem is normalized to the canonical `Resources`.
pub fn find_pack_files<P: AsRef<Path>>(mpkinfo_path: P) -> Vec<PathBuf> {
    let mpkinfo_path = mpkinfo_path.as_ref();
    let parent = mpkinfo_path.parent().unwrap_or_else(|| Path::new("."));

    let mut stem = mpkinfo_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    if stem.to_lowercase().starts_with("resource") {
        stem = "Resources".to_string();
    }

    let mut packs = vec![parent.join(format!("{stem}.mpk"))];

    for i in 1.. {
        let candidate = parent.join(format!("{stem}{i}.mpk"));
        if candidate.is_file() {
            packs.push(candidate);
        } else {
            break;
        }
    }

    packs
}
