//! Random-access reads from pack files, plus the outer compression
//! envelope applied to blobs that may be LZ4-compressed.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ByteOrder};

use crate::error::Result;
use crate::lz4;

/// Read `length` bytes at `offset` from a pack file. Opens and closes
/// the file handle per call — no caching, matching spec.md §5.
pub fn read_blob<P: AsRef<Path>>(pack_path: P, offset: u32, length: u32) -> Result<Vec<u8>> {
    let mut file = File::open(pack_path)?;
    file.seek(SeekFrom::Start(offset as u64))?;
    let mut buf = vec![0u8; length as usize];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Strip the outer compression envelope from a blob.
///
/// - `CCCC` prefix: strip it; if followed by `ZZZ4`, the next u32 LE is
///   the uncompressed size and the remainder is an LZ4 block.
///   Otherwise the bytes after `CCCC` are raw.
/// - `ZZZ4` prefix (no `CCCC`): the next u32 LE is the uncompressed
///   size and the remainder is LZ4 — try `lz4_flex` first, fall back
///   to the permissive decoder on failure or size mismatch.
/// - Anything else: passed through unchanged.
pub fn decompress_envelope(data: &[u8]) -> Vec<u8> {
    if data.len() >= 4 && &data[0..4] == b"CCCC" {
        let rest = &data[4..];
        if rest.len() >= 4 && &rest[0..4] == b"ZZZ4" {
            return decode_zzz4_payload(&rest[4..]);
        }
        return rest.to_vec();
    }

    if data.len() >= 4 && &data[0..4] == b"ZZZ4" {
        return decode_zzz4_payload(&data[4..]);
    }

    data.to_vec()
}

/// Decompress a blob if it begins with a bare `ZZZ4` marker, otherwise
/// pass it through unchanged. Unlike [`decompress_envelope`], this does
/// not recognize the `CCCC` wrapper — only the catalog blob gets that
/// treatment (spec.md §4.C/§4.H); atlas-descriptor and texture blobs
/// are only ever `ZZZ4`-checked.
pub fn decompress_if_zzz4(data: &[u8]) -> Vec<u8> {
    if data.len() >= 4 && &data[0..4] == b"ZZZ4" {
        return decode_zzz4_payload(&data[4..]);
    }
    data.to_vec()
}

/// Decode the body that follows a `ZZZ4` marker: a u32 LE uncompressed
/// size followed by an LZ4 block.
fn decode_zzz4_payload(data: &[u8]) -> Vec<u8> {
    if data.len() < 4 {
        return Vec::new();
    }
    let uncompressed_size = LittleEndian::read_u32(&data[0..4]) as usize;
    let compressed = &data[4..];
    decode_lz4_with_fallback(compressed, uncompressed_size)
}

/// Try the standard LZ4 block decoder first; fall back to the
/// permissive Netease-variant decoder if it errors or produces the
/// wrong number of bytes.
pub fn decode_lz4_with_fallback(compressed: &[u8], uncompressed_size: usize) -> Vec<u8> {
    match lz4_flex::block::decompress(compressed, uncompressed_size) {
        Ok(out) if out.len() == uncompressed_size => out,
        _ => lz4::decode_block(compressed, uncompressed_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ccccc_zzz4_strips_and_decompresses() {
        let mut token_stream = Vec::new();
        token_stream.push(4 << 4);
        token_stream.extend_from_slice(b"data");

        let mut blob = Vec::new();
        blob.extend_from_slice(b"CCCC");
        blob.extend_from_slice(b"ZZZ4");
        blob.extend_from_slice(&4u32.to_le_bytes());
        blob.extend_from_slice(&token_stream);

        let out = decompress_envelope(&blob);
        assert_eq!(out, b"data");
    }

    #[test]
    fn cccc_only_strips_prefix() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"CCCC");
        blob.extend_from_slice(b"plainbytes");

        let out = decompress_envelope(&blob);
        assert_eq!(out, b"plainbytes");
    }

    #[test]
    fn unrecognized_marker_passes_through() {
        let blob = b"whatever".to_vec();
        let out = decompress_envelope(&blob);
        assert_eq!(out, blob);
    }

    #[test]
    fn decompress_if_zzz4_ignores_cccc_wrapper() {
        // A `CCCC`-wrapped blob is not recognized by this helper: only
        // the catalog blob goes through the full envelope.
        let mut blob = Vec::new();
        blob.extend_from_slice(b"CCCC");
        blob.extend_from_slice(b"plainbytes");
        let out = decompress_if_zzz4(&blob);
        assert_eq!(out, blob);
    }

    #[test]
    fn decompress_if_zzz4_decompresses_bare_marker() {
        let mut token_stream = Vec::new();
        token_stream.push(4 << 4);
        token_stream.extend_from_slice(b"data");

        let mut blob = Vec::new();
        blob.extend_from_slice(b"ZZZ4");
        blob.extend_from_slice(&4u32.to_le_bytes());
        blob.extend_from_slice(&token_stream);

        let out = decompress_if_zzz4(&blob);
        assert_eq!(out, b"data");
    }

    #[test]
    fn read_blob_seeks_and_reads_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Resources.mpk");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        file.write_all(b"hello").unwrap();
        drop(file);

        let data = read_blob(&path, 10, 5).unwrap();
        assert_eq!(data, b"hello");
    }
}
