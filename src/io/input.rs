use std::path::Path;

use tracing::debug;

use crate::error::{ExtractError, LoadError};
use crate::io::{DEFAULT_ENCODINGS, TextEncoding, decode_first};
use crate::models::SttResponse;

/// Configuration for loading reference transcripts
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Encodings to try, in order
    pub encodings: Vec<TextEncoding>,
    /// Trim surrounding whitespace (including the trailing newline).
    ///
    /// Reports produced without trimming count a file's trailing newline as
    /// one extra reference character and one miss, so their
    /// `total_characters` and `cer` run one higher per file. Set to `false`
    /// (`--keep-whitespace`) to reproduce those counts.
    pub trim: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.to_vec(),
            trim: true,
        }
    }
}

/// Load a reference transcript, trying each configured encoding in turn
pub fn load_reference(path: &Path, config: &LoaderConfig) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let (encoding, text) =
        decode_first(&bytes, &config.encodings).ok_or_else(|| LoadError::Decode {
            path: path.to_path_buf(),
            tried: config.encodings.clone(),
        })?;
    debug!("Decoded {:?} as {}", path, encoding);

    let text = normalize_newlines(&text);
    Ok(if config.trim {
        text.trim().to_string()
    } else {
        text
    })
}

/// Fold CRLF and lone CR line endings into LF
fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read and parse a stored STT response.
///
/// The outer error is for an unreadable file; the inner one for content that
/// is not JSON.
pub fn read_hypothesis_file(
    path: &Path,
) -> std::io::Result<Result<serde_json::Value, ExtractError>> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content).map_err(|e| ExtractError::Malformed {
        reason: e.to_string(),
    }))
}

/// Build the hypothesis sentence from `output.predicted_words`.
///
/// Whitespace-only words are dropped and the rest joined with single spaces.
pub fn extract_sentence(response: &serde_json::Value) -> Result<String, ExtractError> {
    let response: SttResponse =
        serde_json::from_value(response.clone()).map_err(|e| ExtractError::Malformed {
            reason: e.to_string(),
        })?;

    let words = response
        .predicted_words()
        .ok_or(ExtractError::MissingPath {
            path: "output.predicted_words",
        })?;

    if let Some(covered) = response.covered_ms() {
        debug!("{} predicted words covering {} ms", words.len(), covered);
    }

    let sentence = words
        .iter()
        .filter_map(|w| w.text())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(sentence.trim().to_string())
}
