use std::fmt;
use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::alignment::PairScore;
use crate::io::{
    LoaderConfig, MatchedPair, ReportWriter, completed_ids, extract_sentence, load_reference,
    match_directories, read_hypothesis_file, truncate_incomplete_tail,
};
use crate::models::CorpusRow;

use super::{CorpusSummary, DEFAULT_WORST_ROWS, SummaryBuilder};

/// Alignments above this many table cells get a warning
pub const LARGE_TABLE_CELLS: usize = 25_000_000;

/// Configuration for a batch evaluation run
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub loader: LoaderConfig,
    /// Stop after this many rows have been written
    pub limit: Option<usize>,
    /// Append to an existing report and skip ids it already holds
    pub resume: bool,
    pub show_progress: bool,
    /// Rows listed under "worst" in the run summary
    pub worst_rows: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            limit: None,
            resume: false,
            show_progress: true,
            worst_rows: DEFAULT_WORST_ROWS,
        }
    }
}

/// Why a hypothesis record produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No reference file shares its stem
    NoReference,
    /// The reference file could not be read
    ReferenceUnavailable(String),
    /// The hypothesis file could not be read
    HypothesisUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReference => f.write_str("no matching reference"),
            Self::ReferenceUnavailable(e) => write!(f, "reference unavailable: {}", e),
            Self::HypothesisUnavailable(e) => write!(f, "hypothesis unavailable: {}", e),
        }
    }
}

/// An input problem that still produced a (maximal-error) row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Reference could not be decoded; scored as empty
    UndecodableReference(String),
    /// Hypothesis was not JSON or lacked the word list; scored as empty
    MalformedResponse(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndecodableReference(e) => write!(f, "reference treated as empty: {}", e),
            Self::MalformedResponse(e) => write!(f, "hypothesis treated as empty: {}", e),
        }
    }
}

/// Result of scoring a single matched pair
#[derive(Debug, Clone)]
pub enum PairOutcome {
    Scored {
        row: CorpusRow,
        degradations: Vec<Degradation>,
    },
    Skipped(SkipReason),
}

/// Load, extract and align one pair.
///
/// Touches nothing but the two input files, so pairs can be scored independently.
pub fn score_pair(pair: &MatchedPair, loader: &LoaderConfig) -> PairOutcome {
    let mut degradations = Vec::new();

    let reference = match load_reference(&pair.reference_path, loader) {
        Ok(text) => text,
        Err(e) if e.is_unavailable() => {
            return PairOutcome::Skipped(SkipReason::ReferenceUnavailable(e.to_string()));
        }
        Err(e) => {
            degradations.push(Degradation::UndecodableReference(e.to_string()));
            String::new()
        }
    };

    let parsed = match read_hypothesis_file(&pair.hypothesis_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            return PairOutcome::Skipped(SkipReason::HypothesisUnavailable(format!(
                "{:?}: {}",
                pair.hypothesis_path, e
            )));
        }
    };
    let hypothesis = match parsed.and_then(|value| extract_sentence(&value)) {
        Ok(sentence) => sentence,
        Err(e) => {
            degradations.push(Degradation::MalformedResponse(e.to_string()));
            String::new()
        }
    };

    let cells = PairScore::char_table_cells(&reference, &hypothesis);
    if cells > LARGE_TABLE_CELLS {
        warn!("{}: aligning a {}-cell table", pair.id, cells);
    } else {
        debug!("{}: {} table cells", pair.id, cells);
    }

    let score = PairScore::compute(&reference, &hypothesis);
    PairOutcome::Scored {
        row: CorpusRow::new(&pair.id, reference, hypothesis, score),
        degradations,
    }
}

/// Summary of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub rows_written: usize,
    /// Ids skipped because the report already held them
    pub resumed: usize,
    pub skipped: Vec<(String, SkipReason)>,
    pub degraded: Vec<(String, Degradation)>,
    /// Whether the row limit ended the run early
    pub stopped_at_limit: bool,
    /// Figures over the rows written by this run
    pub summary: CorpusSummary,
}

/// Score every matched pair and append one row per pair to `writer`.
///
/// Hypothesis records without a reference are reported as skipped up front.
pub fn evaluate_pairs(
    pairs: &[MatchedPair],
    unmatched: &[(String, std::path::PathBuf)],
    writer: &mut ReportWriter,
    config: &EvaluatorConfig,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    let mut summary = SummaryBuilder::new(config.worst_rows);

    for (id, path) in unmatched {
        warn!("{}: skipped, no reference for {:?}", id, path);
        outcome.skipped.push((id.clone(), SkipReason::NoReference));
    }

    let already_done = if config.resume {
        completed_ids(writer.path())?
    } else {
        Default::default()
    };

    let progress = if config.show_progress {
        ProgressBar::new(pairs.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );

    for pair in pairs {
        if config.limit.is_some_and(|limit| outcome.rows_written >= limit) {
            info!("Row limit of {} reached", outcome.rows_written);
            outcome.stopped_at_limit = true;
            break;
        }
        progress.set_message(pair.id.clone());

        if already_done.contains(&pair.id) {
            debug!("{}: already in report", pair.id);
            outcome.resumed += 1;
            progress.inc(1);
            continue;
        }

        match score_pair(pair, &config.loader) {
            PairOutcome::Scored { row, degradations } => {
                for degradation in degradations {
                    warn!("{}: {}", pair.id, degradation);
                    outcome.degraded.push((pair.id.clone(), degradation));
                }
                debug!(
                    "{}: {} char errors / {}, {} word errors / {}",
                    pair.id, row.cer, row.total_characters, row.wer, row.total_words
                );
                writer.write_row(&row)?;
                summary.add(&row);
                outcome.rows_written += 1;
            }
            PairOutcome::Skipped(reason) => {
                warn!("{}: skipped, {}", pair.id, reason);
                outcome.skipped.push((pair.id.clone(), reason));
            }
        }
        progress.inc(1);
    }

    progress.finish_with_message("evaluation complete");
    outcome.summary = summary.finish();
    Ok(outcome)
}

/// Evaluate a corpus: pair the directories, score each pair and write the report
pub fn evaluate_corpus(
    references: &Path,
    hypotheses: &Path,
    output: &Path,
    config: &EvaluatorConfig,
) -> Result<BatchOutcome> {
    let matched = match_directories(references, hypotheses)?;
    info!(
        "Matched {} pairs, {} hypothesis records without reference",
        matched.pairs.len(),
        matched.unmatched.len()
    );
    if !matched.duplicate_references.is_empty() {
        warn!(
            "{} reference ids appear more than once; the last file in sorted order is used",
            matched.duplicate_references.len()
        );
    }

    let mut writer = if config.resume {
        if let Some(id) = truncate_incomplete_tail(output)? {
            warn!(
                "Dropped incomplete final record {:?} from {:?}; it will be evaluated again",
                id, output
            );
        }
        ReportWriter::append(output)?
    } else {
        ReportWriter::create(output)?
    };

    let outcome = evaluate_pairs(&matched.pairs, &matched.unmatched, &mut writer, config)?;
    let flushed = writer.finish()?;
    debug!("{} rows flushed to {:?}", flushed, output);
    Ok(outcome)
}
