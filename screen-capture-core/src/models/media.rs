use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A container/codec request understood by the encoder service,
/// e.g. `video/webm;codecs=vp9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaFormat {
    mime_type: String,
}

impl MediaFormat {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
        }
    }

    /// WebM container with the VP9 codec (the preferred recording format).
    pub fn webm_vp9() -> Self {
        Self::new("video/webm;codecs=vp9")
    }

    /// Plain WebM container, codec left to the encoder.
    pub fn webm() -> Self {
        Self::new("video/webm")
    }

    /// Full MIME type including parameters.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Container MIME type with parameters stripped (`video/webm`).
    pub fn container(&self) -> &str {
        self.mime_type.split(';').next().unwrap_or_default().trim()
    }

    /// Value of the `codecs` parameter, if present.
    pub fn codecs(&self) -> Option<&str> {
        self.mime_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("codecs") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
    }

    /// File extension matching the container.
    pub fn extension(&self) -> &str {
        match self.container() {
            "video/webm" => "webm",
            "video/mp4" => "mp4",
            "video/x-matroska" => "mkv",
            "video/quicktime" => "mov",
            other => {
                let subtype = other.split_once('/').map(|(_, s)| s).unwrap_or(other);
                subtype.strip_prefix("x-").unwrap_or(subtype)
            }
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type)
    }
}

/// An opaque RGBA color, written as `#rrggbb` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color: {:?}", hex));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_and_codecs() {
        let format = MediaFormat::webm_vp9();
        assert_eq!(format.container(), "video/webm");
        assert_eq!(format.codecs(), Some("vp9"));
        assert_eq!(format.extension(), "webm");
        assert_eq!(MediaFormat::webm().codecs(), None);
    }

    #[test]
    fn extension_for_unknown_container() {
        assert_eq!(MediaFormat::new("video/x-framepack").extension(), "framepack");
        assert_eq!(MediaFormat::new("video/x-matroska;codecs=avc1").extension(), "mkv");
    }

    #[test]
    fn quoted_codecs_parameter() {
        let format = MediaFormat::new("video/mp4; codecs=\"avc1.42E01E\"");
        assert_eq!(format.codecs(), Some("avc1.42E01E"));
        assert_eq!(format.extension(), "mp4");
    }

    #[test]
    fn color_hex() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!("000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(Color::WHITE.to_hex(), "#ffffff");
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
    }

    #[test]
    fn color_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(1, 2, 3));
    }
}
