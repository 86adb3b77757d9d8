//! Archive reading, catalog resolution, and texture decoding for
//! MESSIAH-engine (`.mpkinfo`/`.mpk`) asset bundles.

pub mod atlas;
pub mod blob;
pub mod catalog;
pub mod error;
pub mod lz4;
pub mod orchestrator;
pub mod pack;
pub mod pixel;
pub mod texture;

pub use atlas::AtlasDescriptor;
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use orchestrator::{extract_sprites, ExtractSummary};
pub use pack::PackEntry;
pub use texture::TextureContainer;
