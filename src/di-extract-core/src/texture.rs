//! MESSIAH `Texture2D` container: header, per-mip slice headers, and
//! slice payload extraction.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::pixel::{self, PixelFormat};

const HEADER_SIZE: usize = 40;
const SLICE_HEADER_SIZE: usize = 16;

/// The fixed 40-byte texture header. Fields with no documented use
/// downstream (`filter`/`addressing` bytes, `flags`, the default clear
/// color) are still parsed so the cursor lands in the right place and
/// so callers that want them don't have to re-derive the layout.
#[derive(Debug, Clone, Copy)]
pub struct TextureHeader {
    pub filter_and_addressing: [u8; 5],
    pub pixel_format: u8,
    pub mip_level_count: u8,
    pub flags: u8,
    pub engine_bytes: [u8; 4],
    pub width: u16,
    pub height: u16,
    pub default_color: [f32; 4],
    pub payload_size: u32,
    pub slice_count: u16,
}

impl TextureHeader {
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::TextureTooSmall(data.len()));
        }

        let mut filter_and_addressing = [0u8; 5];
        filter_and_addressing.copy_from_slice(&data[0x00..0x05]);

        let mut engine_bytes = [0u8; 4];
        engine_bytes.copy_from_slice(&data[0x08..0x0C]);

        let mut default_color = [0f32; 4];
        for (i, chunk) in data[0x10..0x20].chunks_exact(4).enumerate() {
            default_color[i] = LittleEndian::read_f32(chunk);
        }

        Ok(TextureHeader {
            filter_and_addressing,
            pixel_format: data[0x05],
            mip_level_count: data[0x06],
            flags: data[0x07],
            engine_bytes,
            width: LittleEndian::read_u16(&data[0x0C..0x0E]),
            height: LittleEndian::read_u16(&data[0x0E..0x10]),
            default_color,
            payload_size: LittleEndian::read_u32(&data[0x20..0x24]),
            // 0x24..0x26 is an undocumented u16, read and discarded.
            slice_count: LittleEndian::read_u16(&data[0x26..0x28]),
        })
    }
}

/// One mip level's slice header, plus where its block starts in the
/// original byte stream.
#[derive(Debug, Clone, Copy)]
pub struct SliceHeader {
    pub slice_size: u32,
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub row_pitch: u16,
}

struct SliceEntry {
    header: SliceHeader,
    block_offset: usize,
}

fn parse_slice_header(data: &[u8]) -> Option<SliceHeader> {
    if data.len() < SLICE_HEADER_SIZE {
        return None;
    }
    Some(SliceHeader {
        slice_size: LittleEndian::read_u32(&data[0x00..0x04]),
        width: LittleEndian::read_u16(&data[0x04..0x06]),
        height: LittleEndian::read_u16(&data[0x06..0x08]),
        depth: LittleEndian::read_u16(&data[0x08..0x0A]),
        row_pitch: LittleEndian::read_u16(&data[0x0A..0x0C]),
        // 0x0C..0x10 is slice-in-byte, undocumented, discarded.
    })
}

/// A parsed texture container: header plus however many slice headers
/// were readable before truncation.
pub struct TextureContainer {
    pub header: TextureHeader,
    data: Vec<u8>,
    slices: Vec<SliceEntry>,
}

impl TextureContainer {
    /// Parse a texture container from uncompressed bytes.
    ///
    /// Truncation mid-slice-walk keeps whatever slices were already
    /// parsed rather than failing the whole container.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let header = TextureHeader::parse(&data)?;
        if header.slice_count == 0 {
            return Err(Error::NoSlices);
        }

        let mut slices = Vec::new();
        let mut offset = HEADER_SIZE;

        for _ in 0..header.slice_count {
            let Some(block) = data.get(offset..) else {
                break;
            };
            let Some(slice_header) = parse_slice_header(block) else {
                break;
            };
            slices.push(SliceEntry {
                header: slice_header,
                block_offset: offset,
            });
            offset += slice_header.slice_size as usize;
        }

        if slices.is_empty() {
            return Err(Error::NoSlices);
        }

        Ok(TextureContainer {
            header,
            data,
            slices,
        })
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    pub fn slice_header(&self, index: usize) -> Option<&SliceHeader> {
        self.slices.get(index).map(|s| &s.header)
    }

    /// Index of the last (largest) slice, conventionally mip level 0.
    pub fn largest_slice_index(&self) -> usize {
        self.slices.len() - 1
    }

    /// Extract and decompress the raw/compressed bytes for one slice,
    /// stripping its 16-byte header and compression marker.
    fn slice_payload(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .slices
            .get(index)
            .ok_or(Error::MipLevelUnavailable {
                requested: index,
                available: self.slices.len(),
            })?;

        let start = entry.block_offset;
        let end = (start + entry.header.slice_size as usize).min(self.data.len());
        let block = &self.data[start..end];

        if block.len() < SLICE_HEADER_SIZE + 4 {
            return Ok(Vec::new());
        }

        let marker = &block[SLICE_HEADER_SIZE..SLICE_HEADER_SIZE + 4];
        let after_marker = &block[SLICE_HEADER_SIZE + 4..];

        if marker == b"NNNN" {
            Ok(after_marker.to_vec())
        } else if marker == b"ZZZ4" {
            if after_marker.len() < 4 {
                return Ok(Vec::new());
            }
            let uncompressed_size = LittleEndian::read_u32(&after_marker[0..4]) as usize;
            Ok(crate::blob::decode_lz4_with_fallback(
                &after_marker[4..],
                uncompressed_size,
            ))
        } else {
            Ok(block[SLICE_HEADER_SIZE..].to_vec())
        }
    }

    /// Decode one mip level to a tightly packed RGBA8 buffer. Defaults
    /// to the last (largest) slice when `index` is `None`.
    pub fn decode(&self, index: Option<usize>) -> Result<Vec<u8>> {
        let index = index.unwrap_or_else(|| self.largest_slice_index());
        let slice = self
            .slice_header(index)
            .ok_or(Error::MipLevelUnavailable {
                requested: index,
                available: self.slices.len(),
            })?;

        let format = PixelFormat::from_code(self.header.pixel_format)?;
        let payload = self.slice_payload(index)?;
        pixel::decode(format, &payload, slice.width as u32, slice.height as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_header(pixel_format: u8, width: u16, height: u16, slice_count: u16) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0x05] = pixel_format;
        buf[0x06] = 1; // mip level count
        LittleEndian::write_u16(&mut buf[0x0C..0x0E], width);
        LittleEndian::write_u16(&mut buf[0x0E..0x10], height);
        LittleEndian::write_u16(&mut buf[0x26..0x28], slice_count);
        buf
    }

    fn push_slice(buf: &mut Vec<u8>, width: u16, height: u16, marker: &[u8; 4], payload: &[u8]) {
        let slice_size = (SLICE_HEADER_SIZE + 4 + payload.len()) as u32;
        let start = buf.len();
        buf.resize(start + SLICE_HEADER_SIZE, 0);
        LittleEndian::write_u32(&mut buf[start..start + 4], slice_size);
        LittleEndian::write_u16(&mut buf[start + 4..start + 6], width);
        LittleEndian::write_u16(&mut buf[start + 6..start + 8], height);
        buf.extend_from_slice(marker);
        buf.extend_from_slice(payload);
    }

    #[test]
    fn rejects_input_shorter_than_header() {
        let err = TextureContainer::parse(vec![0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::TextureTooSmall(10)));
    }

    #[test]
    fn parses_single_raw_slice() {
        let mut data = build_header(5, 1, 1, 1);
        push_slice(&mut data, 1, 1, b"NNNN", &[10, 20, 30, 40]);

        let container = TextureContainer::parse(data).unwrap();
        assert_eq!(container.slice_count(), 1);
        let decoded = container.decode(None).unwrap();
        assert_eq!(decoded, vec![10, 20, 30, 40]);
    }

    #[test]
    fn walks_multiple_slices_and_picks_largest_by_default() {
        let mut data = build_header(5, 2, 2, 2);
        push_slice(&mut data, 1, 1, b"NNNN", &[1, 1, 1, 1]);
        push_slice(
            &mut data,
            2,
            2,
            b"NNNN",
            &[2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
        );

        let container = TextureContainer::parse(data).unwrap();
        assert_eq!(container.slice_count(), 2);
        assert_eq!(container.largest_slice_index(), 1);
        let decoded = container.decode(None).unwrap();
        assert_eq!(decoded.len(), 16);
    }

    #[test]
    fn truncated_slice_walk_keeps_earlier_slices() {
        let mut data = build_header(5, 1, 1, 3);
        push_slice(&mut data, 1, 1, b"NNNN", &[1, 2, 3, 4]);
        // second and third slice headers are never written; input ends here
        let container = TextureContainer::parse(data).unwrap();
        assert_eq!(container.slice_count(), 1);
    }

    #[test]
    fn unknown_marker_is_treated_as_raw_including_marker_bytes() {
        // An unrecognized marker means the payload starts *at* the
        // marker (slice-block offset 16), not 4 bytes after it.
        let mut data = build_header(5, 1, 1, 1);
        push_slice(&mut data, 1, 1, b"WXYZ", &[9, 8, 7, 6]);
        let container = TextureContainer::parse(data).unwrap();
        let decoded = container.decode(None).unwrap();
        assert_eq!(decoded, b"WXYZ".to_vec());
    }

    #[test]
    fn unsupported_pixel_format_is_an_error() {
        let mut data = build_header(200, 1, 1, 1);
        push_slice(&mut data, 1, 1, b"NNNN", &[1, 2, 3, 4]);
        let container = TextureContainer::parse(data).unwrap();
        let err = container.decode(None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat(200)));
    }

    #[test]
    fn zero_slice_count_is_an_error() {
        let data = build_header(5, 1, 1, 0);
        let err = TextureContainer::parse(data).unwrap_err();
        assert!(matches!(err, Error::NoSlices));
    }

    #[test]
    fn mip_level_out_of_range_is_an_error() {
        let mut data = build_header(5, 1, 1, 1);
        push_slice(&mut data, 1, 1, b"NNNN", &[1, 2, 3, 4]);
        let container = TextureContainer::parse(data).unwrap();
        let err = container.decode(Some(5)).unwrap_err();
        assert!(matches!(err, Error::MipLevelUnavailable { requested: 5, .. }));
    }
}
