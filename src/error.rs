use std::path::PathBuf;

use thiserror::Error;

use crate::io::TextEncoding;

/// Failure to turn a reference file into text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reference file not found: {path:?}")]
    MissingFile { path: PathBuf },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path:?} with any of {tried:?}")]
    Decode {
        path: PathBuf,
        tried: Vec<TextEncoding>,
    },
}

impl LoadError {
    /// Whether the file itself is unavailable, as opposed to present but undecodable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::MissingFile { .. } | Self::Io { .. })
    }
}

/// Failure to pull the hypothesis sentence out of an STT response.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response is not valid JSON: {reason}")]
    Malformed { reason: String },
    #[error("response has no `{path}`")]
    MissingPath { path: &'static str },
}
