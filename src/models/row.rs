use serde::{Deserialize, Serialize};

use crate::alignment::{PairScore, rate};

/// Report column order
pub const REPORT_COLUMNS: [&str; 8] = [
    "file_name",
    "annotated",
    "generated",
    "total_characters",
    "total_words",
    "cer",
    "wer",
    "missed_characters",
];

/// One scored reference/hypothesis pair, as written to the report.
///
/// `cer` and `wer` hold error counts; rates are derived with [`CorpusRow::cer_rate`]
/// and [`CorpusRow::wer_rate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRow {
    pub file_name: String,
    /// Reference (ground-truth) text
    pub annotated: String,
    /// Hypothesis text extracted from the STT response
    pub generated: String,
    pub total_characters: usize,
    pub total_words: usize,
    pub cer: usize,
    pub wer: usize,
    /// JSON array of the reference characters missing from the alignment
    pub missed_characters: String,
}

impl CorpusRow {
    pub fn new(file_name: &str, annotated: String, generated: String, score: PairScore) -> Self {
        let missed: Vec<String> = score
            .missed_characters
            .iter()
            .map(|c| c.to_string())
            .collect();

        Self {
            file_name: file_name.to_string(),
            annotated,
            generated,
            total_characters: score.total_characters,
            total_words: score.total_words,
            cer: score.char_errors,
            wer: score.word_errors,
            missed_characters: serde_json::to_string(&missed).unwrap_or_else(|_| "[]".to_string()),
        }
    }

    pub fn cer_rate(&self) -> Option<f64> {
        rate(self.cer, self.total_characters)
    }

    pub fn wer_rate(&self) -> Option<f64> {
        rate(self.wer, self.total_words)
    }
}
