//! `resource.repository` catalog parser: binds logical resource names
//! to content-addressed GUID paths.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

/// One entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub logical_name: String,
    pub hash: [u8; 16],
    pub folder_index: u16,
    pub type_index: u16,
}

impl ResourceRecord {
    /// Content-addressed GUID path derived from the hash: the first
    /// byte is duplicated as both the directory segment and the start
    /// of the GUID filename.
    pub fn guid_path(&self) -> String {
        let h = &self.hash;
        format!(
            "{:02x}/{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            h[0],
            h[0], h[1], h[2], h[3],
            h[4], h[5],
            h[6], h[7],
            h[8], h[9],
            h[10], h[11], h[12], h[13], h[14], h[15],
        )
    }
}

/// Resolved, human-readable view of a [`ResourceRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub logical_name: String,
    pub guid_path: String,
    pub resource_type: String,
    pub folder_path: String,
    pub hex_hash: String,
}

/// Parsed `resource.repository`: type/folder string tables plus the
/// ordered resource list. Built once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub resource_types: Vec<String>,
    pub folder_paths: Vec<String>,
    pub entries: Vec<ResourceRecord>,
}

impl Catalog {
    /// Parse the uncompressed `resource.repository` bytes.
    ///
    /// Any field whose semantics are undocumented (`unknown_flag1`,
    /// `unknown_flag2`, the per-entry `unknown1`/`unknown2`/`flag`) is
    /// read to advance the cursor correctly and otherwise discarded —
    /// per spec, guessing at their meaning is out of scope.
    pub fn parse(data: &[u8]) -> Self {
        let mut cursor = std::io::Cursor::new(data);
        let mut resource_types = Vec::new();
        let mut folder_paths = Vec::new();
        let mut entries = Vec::new();

        if parse_header(&mut cursor, &mut resource_types, &mut folder_paths).is_some() {
            while let Some(entry) = parse_entry(&mut cursor) {
                entries.push(entry);
            }
        }

        Catalog {
            resource_types,
            folder_paths,
            entries,
        }
    }

    /// Find entries whose logical name contains (or, if `exact`,
    /// equals) `needle`. Case-insensitive unless `exact`.
    pub fn find_by_name(&self, needle: &str, exact: bool) -> Vec<&ResourceRecord> {
        if exact {
            self.entries.iter().filter(|e| e.logical_name == needle).collect()
        } else {
            let needle_lower = needle.to_lowercase();
            self.entries
                .iter()
                .filter(|e| e.logical_name.to_lowercase().contains(&needle_lower))
                .collect()
        }
    }

    /// Find all entries of a given resource type name. Empty if the
    /// type name is absent from the type table.
    pub fn find_by_type(&self, type_name: &str) -> Vec<&ResourceRecord> {
        let Some(type_index) = self.resource_types.iter().position(|t| t == type_name) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| e.type_index as usize == type_index)
            .collect()
    }

    /// Resolve a record's indices into readable strings. Out-of-range
    /// indices produce `Unknown(<index>)` placeholders rather than
    /// failing.
    pub fn resolve(&self, record: &ResourceRecord) -> ResolvedResource {
        let resource_type = self
            .resource_types
            .get(record.type_index as usize)
            .cloned()
            .unwrap_or_else(|| format!("Unknown({})", record.type_index));

        let folder_path = self
            .folder_paths
            .get(record.folder_index as usize)
            .cloned()
            .unwrap_or_else(|| format!("Unknown({})", record.folder_index));

        ResolvedResource {
            logical_name: record.logical_name.clone(),
            guid_path: record.guid_path(),
            resource_type,
            folder_path,
            hex_hash: record.hash.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }
}

fn parse_header<R: Read>(
    reader: &mut R,
    resource_types: &mut Vec<String>,
    folder_paths: &mut Vec<String>,
) -> Option<()> {
    let _version = reader.read_u32::<LittleEndian>().ok()?;
    let _unknown_flag1 = reader.read_u16::<LittleEndian>().ok()?;
    let _unknown_flag2 = reader.read_u32::<LittleEndian>().ok()?;

    let types_len = reader.read_u16::<LittleEndian>().ok()? as usize;
    let mut types_bytes = vec![0u8; types_len];
    reader.read_exact(&mut types_bytes).ok()?;
    *resource_types = String::from_utf8_lossy(&types_bytes)
        .split(';')
        .map(str::to_string)
        .collect();

    let paths_len = reader.read_u16::<LittleEndian>().ok()? as usize;
    let mut paths_bytes = vec![0u8; paths_len];
    reader.read_exact(&mut paths_bytes).ok()?;
    *folder_paths = String::from_utf8_lossy(&paths_bytes)
        .split(';')
        .map(str::to_string)
        .collect();

    Some(())
}

fn parse_entry<R: Read>(reader: &mut R) -> Option<ResourceRecord> {
    let _unknown1 = reader.read_u16::<LittleEndian>().ok()?;
    let _unknown2 = reader.read_u16::<LittleEndian>().ok()?;
    let mut flag = [0u8; 1];
    reader.read_exact(&mut flag).ok()?;
    let _flag = flag[0];

    let mut hash = [0u8; 16];
    reader.read_exact(&mut hash).ok()?;

    let name_len = reader.read_u16::<LittleEndian>().ok()? as usize;
    let mut name_bytes = vec![0u8; name_len];
    reader.read_exact(&mut name_bytes).ok()?;
    let logical_name = String::from_utf8_lossy(&name_bytes).into_owned();

    let folder_index = reader.read_u16::<LittleEndian>().ok()?;
    let type_index = reader.read_u16::<LittleEndian>().ok()?;

    let related_count = reader.read_u16::<LittleEndian>().ok()? as usize;
    let mut related = vec![0u8; related_count * 16];
    reader.read_exact(&mut related).ok()?;

    Some(ResourceRecord {
        logical_name,
        hash,
        folder_index,
        type_index,
    })
}
