use std::path::Path;

use anyhow::Result;

use crate::io::{collect_files, completed_ids, match_files};

/// Progress of a corpus evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStatus {
    pub reference_files: usize,
    pub hypothesis_records: usize,
    pub matched_pairs: usize,
    /// Hypothesis records with no reference
    pub unmatched_hypotheses: usize,
    /// Matched ids already present in the report
    pub reported: usize,
    /// Matched ids not yet in the report
    pub remaining: usize,
}

impl CorpusStatus {
    /// Percentage of matched pairs already reported
    pub fn progress_percent(&self) -> Option<f64> {
        (self.matched_pairs > 0).then(|| self.reported as f64 / self.matched_pairs as f64 * 100.0)
    }
}

/// Compare the two input directories against an (optional) existing report
pub fn corpus_status(
    references: &Path,
    hypotheses: &Path,
    report: Option<&Path>,
) -> Result<CorpusStatus> {
    let reference_files = collect_files(references)?;
    let hypothesis_files = collect_files(hypotheses)?;
    let matched = match_files(&reference_files, &hypothesis_files);

    let done = match report {
        Some(path) => completed_ids(path)?,
        None => Default::default(),
    };
    let reported = matched.pairs.iter().filter(|p| done.contains(&p.id)).count();

    Ok(CorpusStatus {
        reference_files: reference_files.len(),
        hypothesis_records: hypothesis_files.len(),
        matched_pairs: matched.pairs.len(),
        unmatched_hypotheses: matched.unmatched.len(),
        reported,
        remaining: matched.pairs.len() - reported,
    })
}
