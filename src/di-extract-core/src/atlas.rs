//! Cocos2d-style sprite atlas descriptor (`.plist`) parsing.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One sprite's rectangle within its atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub frame_rect: (i64, i64, i64, i64),
    pub rotated: bool,
}

/// A parsed atlas descriptor: sprite name -> frame rect, plus the name
/// of the texture file the frames crop from.
#[derive(Debug, Clone)]
pub struct AtlasDescriptor {
    pub frames: BTreeMap<String, FrameInfo>,
    pub texture_filename: String,
}

#[derive(Debug, Deserialize, Default)]
struct RawPlist {
    #[serde(default)]
    frames: BTreeMap<String, RawFrame>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize, Default)]
struct RawFrame {
    #[serde(default)]
    frame: Option<String>,
    #[serde(default)]
    rotated: bool,
}

#[derive(Debug, Deserialize, Default)]
struct RawMetadata {
    #[serde(rename = "textureFileName", default)]
    texture_file_name: String,
}

impl AtlasDescriptor {
    /// Parse a `.plist` atlas descriptor.
    ///
    /// Returns `Ok(None)` for a well-formed but invalid descriptor (no
    /// frames, or no `textureFileName`) — those are skipped silently
    /// and are not counted as failures. A malformed property list
    /// (not valid XML) is a genuine error that the orchestrator counts
    /// as one atlas failure.
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        let raw: RawPlist = plist::from_bytes(data).map_err(|_| Error::CatalogUnparseable)?;

        if raw.frames.is_empty() || raw.metadata.texture_file_name.is_empty() {
            return Ok(None);
        }

        let frames = raw
            .frames
            .into_iter()
            .map(|(name, frame)| {
                let frame_str = frame.frame.as_deref().unwrap_or("{{0,0},{0,0}}");
                let frame_rect = parse_frame_string(frame_str);
                (
                    name,
                    FrameInfo {
                        frame_rect,
                        rotated: frame.rotated,
                    },
                )
            })
            .collect();

        Ok(Some(AtlasDescriptor {
            frames,
            texture_filename: raw.metadata.texture_file_name,
        }))
    }
}

/// Parse a Cocos2d frame string like `"{{2,2},{80,80}}"` into
/// `(x, y, w, h)`. Malformed strings parse as zero.
fn parse_frame_string(s: &str) -> (i64, i64, i64, i64) {
    let clean = s.replace(['{', '}'], "");
    let mut parts = clean.split(',').map(|p| p.trim().parse::<i64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_string_parses_known_vector() {
        assert_eq!(parse_frame_string("{{2,2},{80,80}}"), (2, 2, 80, 80));
    }

    const SAMPLE_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>frames</key>
  <dict>
    <key>hero_idle.png</key>
    <dict>
      <key>frame</key>
      <string>{{0,0},{32,32}}</string>
      <key>rotated</key>
      <false/>
    </dict>
    <key>hero_run.png</key>
    <dict>
      <key>frame</key>
      <string>{{32,0},{16,32}}</string>
      <key>rotated</key>
      <true/>
    </dict>
  </dict>
  <key>metadata</key>
  <dict>
    <key>textureFileName</key>
    <string>hero.png</string>
  </dict>
</dict>
</plist>"#;

    #[test]
    fn parses_well_formed_descriptor() {
        let descriptor = AtlasDescriptor::parse(SAMPLE_PLIST.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.texture_filename, "hero.png");
        assert_eq!(descriptor.frames.len(), 2);
        let run = &descriptor.frames["hero_run.png"];
        assert_eq!(run.frame_rect, (32, 0, 16, 32));
        assert!(run.rotated);
        let idle = &descriptor.frames["hero_idle.png"];
        assert!(!idle.rotated);
    }

    #[test]
    fn missing_texture_filename_is_skipped_silently() {
        const NO_TEXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
  <key>frames</key>
  <dict>
    <key>a.png</key>
    <dict><key>frame</key><string>{{0,0},{1,1}}</string></dict>
  </dict>
  <key>metadata</key>
  <dict></dict>
</dict>
</plist>"#;
        let descriptor = AtlasDescriptor::parse(NO_TEXTURE.as_bytes()).unwrap();
        assert!(descriptor.is_none());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result = AtlasDescriptor::parse(b"not a plist at all");
        assert!(result.is_err());
    }
}
