use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text encodings the reference loader can try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

/// Default fallback order: strict UTF-8 first, then the single-byte encodings
pub const DEFAULT_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

/// CP1252 code points for bytes 0x80..=0x9F; `None` marks undefined bytes
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let text = std::str::from_utf8(bytes).ok()?;
                Some(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_string())
            }
            // Every byte maps to the code point of the same value
            Self::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Self::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize],
                    _ => Some(b as char),
                })
                .collect(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "cp1252" | "windows-1252" => Ok(Self::Windows1252),
            other => Err(format!(
                "unknown encoding '{}' (expected utf-8, latin-1 or cp1252)",
                other
            )),
        }
    }
}

/// Decode with the first encoding in `order` that accepts the bytes
pub fn decode_first(bytes: &[u8], order: &[TextEncoding]) -> Option<(TextEncoding, String)> {
    order
        .iter()
        .find_map(|&encoding| encoding.decode(bytes).map(|text| (encoding, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_strips_bom() {
        let bytes = "\u{FEFF}আমি".as_bytes();
        assert_eq!(TextEncoding::Utf8.decode(bytes).unwrap(), "আমি");
    }

    #[test]
    fn test_utf8_rejects_invalid_bytes() {
        assert!(TextEncoding::Utf8.decode(&[0x63, 0x61, 0xE9]).is_none());
    }

    #[test]
    fn test_latin1_accepts_everything() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = TextEncoding::Latin1.decode(&bytes).unwrap();
        assert_eq!(text.chars().count(), 256);
        assert_eq!(TextEncoding::Latin1.decode(&[0xE9]).unwrap(), "é");
    }

    #[test]
    fn test_cp1252() {
        assert_eq!(TextEncoding::Windows1252.decode(&[0x80, 0x41]).unwrap(), "€A");
        assert_eq!(TextEncoding::Windows1252.decode(&[0x93, 0x94]).unwrap(), "\u{201C}\u{201D}");
        assert!(TextEncoding::Windows1252.decode(&[0x41, 0x81]).is_none());
        assert!(TextEncoding::Windows1252.decode(&[0x9D]).is_none());
    }

    #[test]
    fn test_decode_first_respects_order() {
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        let (encoding, text) = decode_first(&bytes, &DEFAULT_ENCODINGS).unwrap();
        assert_eq!(encoding, TextEncoding::Latin1);
        assert_eq!(text, "café");

        let (encoding, _) = decode_first(&bytes, &[TextEncoding::Windows1252]).unwrap();
        assert_eq!(encoding, TextEncoding::Windows1252);

        assert!(decode_first(&[0x81], &[TextEncoding::Utf8, TextEncoding::Windows1252]).is_none());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("latin_1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!("windows-1252".parse::<TextEncoding>().unwrap(), TextEncoding::Windows1252);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }
}
