//! Pixel-format decoders: MESSIAH texture slice bytes -> RGBA8.

use crate::error::{Error, Result};

pub const PIXEL_FORMAT_R8G8B8A8: u8 = 5;
pub const PIXEL_FORMAT_BC1: u8 = 18;
pub const PIXEL_FORMAT_BC7: u8 = 25;
pub const PIXEL_FORMAT_ASTC_4X4: u8 = 36;
pub const PIXEL_FORMAT_ASTC_6X6: u8 = 40;
pub const PIXEL_FORMAT_ASTC_8X8: u8 = 43;

/// The closed set of pixel formats this extractor can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Bc1,
    Bc7,
    Astc(u32, u32),
}

impl PixelFormat {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            PIXEL_FORMAT_R8G8B8A8 => Ok(Self::Rgba8),
            PIXEL_FORMAT_BC1 => Ok(Self::Bc1),
            PIXEL_FORMAT_BC7 => Ok(Self::Bc7),
            PIXEL_FORMAT_ASTC_4X4 => Ok(Self::Astc(4, 4)),
            PIXEL_FORMAT_ASTC_6X6 => Ok(Self::Astc(6, 6)),
            PIXEL_FORMAT_ASTC_8X8 => Ok(Self::Astc(8, 8)),
            other => Err(Error::UnsupportedPixelFormat(other)),
        }
    }
}

/// Decode a slice's raw/compressed bytes to a tightly packed RGBA8
/// buffer of `width * height * 4` bytes.
pub fn decode(format: PixelFormat, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    match format {
        PixelFormat::Rgba8 => decode_rgba8(data, width, height),
        PixelFormat::Bc1 => decode_block_compressed(data, width, height, |d, w, h, img| {
            texture2ddecoder::decode_bc1(d, w, h, img)
        }),
        PixelFormat::Bc7 => decode_block_compressed(data, width, height, |d, w, h, img| {
            texture2ddecoder::decode_bc7(d, w, h, img)
        }),
        PixelFormat::Astc(bw, bh) => {
            decode_block_compressed(data, width, height, |d, w, h, img| {
                texture2ddecoder::decode_astc(d, w, h, bw as usize, bh as usize, img)
            })
        }
    }
}

/// Raw RGBA8 rows, copied through unchanged.
fn decode_rgba8(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = (width as usize) * (height as usize) * 4;
    if data.len() < expected {
        return Err(Error::TruncatedHeader {
            needed: expected,
            actual: data.len(),
        });
    }
    Ok(data[..expected].to_vec())
}

/// Run a `texture2ddecoder` block decoder and permute its BGRA output
/// to RGBA.
fn decode_block_compressed(
    data: &[u8],
    width: u32,
    height: u32,
    decode_fn: impl FnOnce(&[u8], usize, usize, &mut [u32]) -> std::result::Result<(), &'static str>,
) -> Result<Vec<u8>> {
    let w = width as usize;
    let h = height as usize;
    let mut pixels = vec![0u32; w * h];
    decode_fn(data, w, h, &mut pixels).map_err(|_| Error::TruncatedHeader {
        needed: w * h,
        actual: data.len(),
    })?;
    Ok(bgra_words_to_rgba_bytes(&pixels))
}

/// `texture2ddecoder` packs each pixel as a little-endian u32 whose
/// bytes are, in memory order, B, G, R, A. Permute to R, G, B, A.
fn bgra_words_to_rgba_bytes(pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 4);
    for &pixel in pixels {
        let [b, g, r, a] = pixel.to_le_bytes();
        out.extend_from_slice(&[r, g, b, a]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_codes_map_to_expected_variants() {
        assert_eq!(PixelFormat::from_code(5).unwrap(), PixelFormat::Rgba8);
        assert_eq!(PixelFormat::from_code(18).unwrap(), PixelFormat::Bc1);
        assert_eq!(PixelFormat::from_code(25).unwrap(), PixelFormat::Bc7);
        assert_eq!(PixelFormat::from_code(36).unwrap(), PixelFormat::Astc(4, 4));
        assert_eq!(PixelFormat::from_code(40).unwrap(), PixelFormat::Astc(6, 6));
        assert_eq!(PixelFormat::from_code(43).unwrap(), PixelFormat::Astc(8, 8));
    }

    #[test]
    fn unsupported_format_is_a_typed_error() {
        let err = PixelFormat::from_code(99).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat(99)));
    }

    #[test]
    fn rgba8_passthrough_copies_bytes() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let out = decode(PixelFormat::Rgba8, &data, 1, 2).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn rgba8_truncated_input_errors() {
        let data = vec![1, 2, 3];
        let err = decode(PixelFormat::Rgba8, &data, 1, 2).unwrap_err();
        assert!(matches!(err, Error::TruncatedHeader { .. }));
    }

    #[test]
    fn bgra_word_permutation_swaps_r_and_b() {
        // pixel with B=0x10, G=0x20, R=0x30, A=0x40 in memory (LE u32)
        let word = u32::from_le_bytes([0x10, 0x20, 0x30, 0x40]);
        let out = bgra_words_to_rgba_bytes(&[word]);
        assert_eq!(out, vec![0x30, 0x20, 0x10, 0x40]);
    }
}
