use std::cmp::Ordering;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::alignment::rate;
use crate::io::{read_report, write_json};
use crate::models::CorpusRow;

/// Default number of worst rows kept in a summary
pub const DEFAULT_WORST_ROWS: usize = 10;

/// Corpus-level accuracy figures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub rows: usize,
    pub total_characters: usize,
    pub total_words: usize,
    pub char_errors: usize,
    pub word_errors: usize,
    /// Total character errors over total reference characters
    pub corpus_cer: Option<f64>,
    /// Total word errors over total reference words
    pub corpus_wer: Option<f64>,
    /// Mean per-file CER over rows with a non-empty reference
    pub mean_file_cer: Option<f64>,
    pub mean_file_wer: Option<f64>,
    /// Rows without a single character error
    pub perfect_rows: usize,
    /// Rows whose reference was empty (missing or undecodable)
    pub empty_reference_rows: usize,
    /// Highest per-file CER first
    pub worst: Vec<WorstRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorstRow {
    pub file_name: String,
    pub cer: f64,
    pub wer: Option<f64>,
    pub char_errors: usize,
}

/// Accumulates rows one at a time without keeping them
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    worst_n: usize,
    summary: CorpusSummary,
    cer_sum: f64,
    cer_count: usize,
    wer_sum: f64,
    wer_count: usize,
    candidates: Vec<WorstRow>,
}

impl SummaryBuilder {
    pub fn new(worst_n: usize) -> Self {
        Self {
            worst_n,
            summary: CorpusSummary::default(),
            cer_sum: 0.0,
            cer_count: 0,
            wer_sum: 0.0,
            wer_count: 0,
            candidates: Vec::new(),
        }
    }

    pub fn add(&mut self, row: &CorpusRow) {
        let s = &mut self.summary;
        s.rows += 1;
        s.total_characters += row.total_characters;
        s.total_words += row.total_words;
        s.char_errors += row.cer;
        s.word_errors += row.wer;
        if row.cer == 0 {
            s.perfect_rows += 1;
        }
        if row.total_characters == 0 {
            s.empty_reference_rows += 1;
        }

        if let Some(cer) = row.cer_rate() {
            self.cer_sum += cer;
            self.cer_count += 1;
            self.candidates.push(WorstRow {
                file_name: row.file_name.clone(),
                cer,
                wer: row.wer_rate(),
                char_errors: row.cer,
            });
        }
        if let Some(wer) = row.wer_rate() {
            self.wer_sum += wer;
            self.wer_count += 1;
        }
    }

    pub fn finish(self) -> CorpusSummary {
        let mut summary = self.summary;
        summary.corpus_cer = rate(summary.char_errors, summary.total_characters);
        summary.corpus_wer = rate(summary.word_errors, summary.total_words);
        summary.mean_file_cer = mean(self.cer_sum, self.cer_count);
        summary.mean_file_wer = mean(self.wer_sum, self.wer_count);

        let mut worst = self.candidates;
        worst.sort_by(|a, b| {
            b.cer
                .partial_cmp(&a.cer)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        worst.retain(|w| w.char_errors > 0);
        worst.truncate(self.worst_n);
        summary.worst = worst;

        summary
    }
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

impl CorpusSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a CorpusRow>, worst_n: usize) -> Self {
        let mut builder = SummaryBuilder::new(worst_n);
        for row in rows {
            builder.add(row);
        }
        builder.finish()
    }

    /// Human-readable summary block
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str("Corpus Summary\n");
        output.push_str("==============\n");
        output.push_str(&format!("Rows: {}\n", self.rows));
        output.push_str(&format!(
            "Reference size: {} characters, {} words\n",
            self.total_characters, self.total_words
        ));
        output.push_str(&format!(
            "Errors: {} characters, {} words\n",
            self.char_errors, self.word_errors
        ));
        output.push_str(&format!("Corpus CER: {}\n", percent(self.corpus_cer)));
        output.push_str(&format!("Corpus WER: {}\n", percent(self.corpus_wer)));
        output.push_str(&format!("Mean file CER: {}\n", percent(self.mean_file_cer)));
        output.push_str(&format!("Mean file WER: {}\n", percent(self.mean_file_wer)));
        output.push_str(&format!("Perfect rows: {}\n", self.perfect_rows));
        output.push_str(&format!("Empty references: {}\n", self.empty_reference_rows));

        if !self.worst.is_empty() {
            output.push_str("\nWorst Files\n");
            output.push_str("-----------\n");
            for w in &self.worst {
                output.push_str(&format!(
                    "{}: CER {}, WER {} ({} chars missed)\n",
                    w.file_name,
                    percent(Some(w.cer)),
                    percent(w.wer),
                    w.char_errors
                ));
            }
        }

        output
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Summary as written to disk
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport<'a> {
    pub generated_at: String,
    pub report_path: String,
    pub summary: &'a CorpusSummary,
}

/// Write `summary` as JSON next to the report it describes
pub fn write_summary_json(summary: &CorpusSummary, report_path: &Path, path: &Path) -> Result<()> {
    let report = SummaryReport {
        generated_at: Utc::now().to_rfc3339(),
        report_path: report_path.display().to_string(),
        summary,
    };
    write_json(&report, path)
}

/// Summarize an existing report file
pub fn summarize_report(path: &Path, worst_n: usize) -> Result<CorpusSummary> {
    let rows = read_report(path)?;
    Ok(CorpusSummary::from_rows(&rows, worst_n))
}
