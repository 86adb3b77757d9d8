//! Error types for the MPK/MESSIAH decoding pipeline.

use std::path::PathBuf;

/// Errors that can abort an extraction run or a single blob/texture decode.
///
/// Fatal preconditions (missing index, missing/unparseable catalog) are
/// meant to propagate out of [`crate::orchestrator::extract_sprites`].
/// Everything else is caught by the orchestrator and folded into its
/// `(extracted, failed)` counters rather than aborting the run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pack index not found: {0}")]
    MissingIndex(PathBuf),

    #[error("no resource.repository entry found in pack index")]
    MissingCatalogEntry,

    #[error("resource.repository could not be parsed")]
    CatalogUnparseable,

    #[error("data too short: need {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },

    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(u8),

    #[error("unknown outer compression marker: {0:?}")]
    UnknownCompressionMarker([u8; 4]),

    #[error("LZ4 decode produced {actual} bytes, expected {expected}")]
    Lz4SizeMismatch { expected: usize, actual: usize },

    #[error("texture container too small for header ({0} bytes)")]
    TextureTooSmall(usize),

    #[error("texture has no slices")]
    NoSlices,

    #[error("mip level {requested} not available ({available} slices)")]
    MipLevelUnavailable { requested: usize, available: usize },

    #[error("pack index {0} has no matching pack file")]
    PackIndexOutOfRange(u32),

    #[error("frame rect is out of bounds or non-positive")]
    FrameOutOfBounds,

    #[error("PNG encode error: {0}")]
    Png(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
