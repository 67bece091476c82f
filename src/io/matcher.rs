use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// A reference file and hypothesis record that share a stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub id: String,
    pub reference_path: PathBuf,
    pub hypothesis_path: PathBuf,
}

/// Result of pairing two directory listings
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Pairs in hypothesis listing order
    pub pairs: Vec<MatchedPair>,
    /// Hypothesis records with no reference counterpart
    pub unmatched: Vec<(String, PathBuf)>,
    /// Reference stems that appeared more than once (the last path won)
    pub duplicate_references: Vec<String>,
}

/// File identifier: the file name up to its first `.`
pub fn stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Regular files directly inside `dir`, sorted by path
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list directory: {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Index reference files by stem; on duplicates the last file wins
pub fn index_by_stem(files: &[PathBuf]) -> (HashMap<String, PathBuf>, Vec<String>) {
    let mut index = HashMap::with_capacity(files.len());
    let mut duplicates = Vec::new();

    for path in files {
        let Some(id) = stem(path) else {
            debug!("Ignoring {:?}: no usable stem", path);
            continue;
        };
        if let Some(previous) = index.insert(id.clone(), path.clone()) {
            warn!("Duplicate reference id {}: {:?} replaces {:?}", id, path, previous);
            duplicates.push(id);
        }
    }

    (index, duplicates)
}

/// Pair hypothesis records with reference files by stem
pub fn match_files(reference_files: &[PathBuf], hypothesis_files: &[PathBuf]) -> MatchResult {
    let (index, duplicate_references) = index_by_stem(reference_files);
    let mut result = MatchResult {
        duplicate_references,
        ..Default::default()
    };

    for path in hypothesis_files {
        let Some(id) = stem(path) else {
            debug!("Ignoring {:?}: no usable stem", path);
            continue;
        };
        match index.get(&id) {
            Some(reference_path) => result.pairs.push(MatchedPair {
                id,
                reference_path: reference_path.clone(),
                hypothesis_path: path.clone(),
            }),
            None => result.unmatched.push((id, path.clone())),
        }
    }

    result
}

/// List both directories and pair their files
pub fn match_directories(references: &Path, hypotheses: &Path) -> Result<MatchResult> {
    let reference_files = collect_files(references)?;
    let hypothesis_files = collect_files(hypotheses)?;
    debug!(
        "{} reference files, {} hypothesis records",
        reference_files.len(),
        hypothesis_files.len()
    );
    Ok(match_files(&reference_files, &hypothesis_files))
}
