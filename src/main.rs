use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stt_bench::batch::DEFAULT_WORST_ROWS;
use stt_bench::io::DEFAULT_ENCODINGS;
use stt_bench::{
    EvaluatorConfig, LoaderConfig, TextEncoding, corpus_status, evaluate_corpus,
    summarize_report, write_summary_json,
};

#[derive(Parser)]
#[command(name = "stt-bench")]
#[command(author, version, about = "Benchmark speech-to-text output against ground-truth transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every hypothesis record against its reference and write the report
    Evaluate {
        /// Directory of reference (ground-truth) text files
        #[arg(short, long)]
        references: PathBuf,

        /// Directory of stored STT responses (JSON)
        #[arg(long)]
        hypotheses: PathBuf,

        /// Report file (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Stop after this many rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Append to an existing report, skipping ids it already contains
        #[arg(long)]
        resume: bool,

        /// Reference encodings to try, in order
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ENCODINGS)]
        encodings: Vec<TextEncoding>,

        /// Keep surrounding whitespace in reference texts
        #[arg(long)]
        keep_whitespace: bool,

        /// Also write the run summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize an existing report
    Summarize {
        /// Report file (CSV)
        #[arg(short, long)]
        report: PathBuf,

        /// Number of worst files to list
        #[arg(long, default_value_t = DEFAULT_WORST_ROWS)]
        worst: usize,

        /// Also write the summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how much of a corpus has been evaluated
    Status {
        /// Directory of reference (ground-truth) text files
        #[arg(short, long)]
        references: PathBuf,

        /// Directory of stored STT responses (JSON)
        #[arg(long)]
        hypotheses: PathBuf,

        /// Existing report (CSV)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            references,
            hypotheses,
            output,
            limit,
            resume,
            encodings,
            keep_whitespace,
            summary_json,
            no_progress,
            verbose,
        } => {
            setup_logging(verbose);
            let config = EvaluatorConfig {
                loader: LoaderConfig {
                    encodings,
                    trim: !keep_whitespace,
                },
                limit,
                resume,
                show_progress: !no_progress,
                ..Default::default()
            };
            evaluate(references, hypotheses, output, summary_json, config)
        }
        Commands::Summarize {
            report,
            worst,
            json,
            verbose,
        } => {
            setup_logging(verbose);
            summarize(report, worst, json)
        }
        Commands::Status {
            references,
            hypotheses,
            report,
            verbose,
        } => {
            setup_logging(verbose);
            status(references, hypotheses, report)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn evaluate(
    references: PathBuf,
    hypotheses: PathBuf,
    output: PathBuf,
    summary_json: Option<PathBuf>,
    config: EvaluatorConfig,
) -> Result<()> {
    info!(
        "Evaluating {:?} against {:?} (encodings: {:?})",
        hypotheses, references, config.loader.encodings
    );
    let outcome = evaluate_corpus(&references, &hypotheses, &output, &config)
        .context("Evaluation aborted")?;

    info!("Report written to {:?}", output);
    info!(
        "Complete: {} rows written, {} already reported, {} skipped, {} degraded",
        outcome.rows_written,
        outcome.resumed,
        outcome.skipped.len(),
        outcome.degraded.len()
    );
    if outcome.stopped_at_limit {
        info!("Stopped early at the row limit; rerun with --resume to continue");
    }

    println!();
    print!("{}", outcome.summary.render());

    if let Some(path) = summary_json {
        write_summary_json(&outcome.summary, &output, &path)?;
        info!("Summary written to {:?}", path);
    }

    Ok(())
}

fn summarize(report: PathBuf, worst: usize, json: Option<PathBuf>) -> Result<()> {
    info!("Summarizing {:?}", report);
    let summary = summarize_report(&report, worst).context("Failed to summarize report")?;

    print!("{}", summary.render());

    if let Some(path) = json {
        write_summary_json(&summary, &report, &path)?;
        info!("Summary written to {:?}", path);
    }

    Ok(())
}

fn status(references: PathBuf, hypotheses: PathBuf, report: Option<PathBuf>) -> Result<()> {
    let status = corpus_status(&references, &hypotheses, report.as_deref())?;

    println!("Corpus Status");
    println!("=============");
    println!("Reference files:      {}", status.reference_files);
    println!("Hypothesis records:   {}", status.hypothesis_records);
    println!("Matched pairs:        {}", status.matched_pairs);
    println!("Without reference:    {}", status.unmatched_hypotheses);
    println!("Already reported:     {}", status.reported);
    println!("Remaining:            {}", status.remaining);
    if let Some(pct) = status.progress_percent() {
        println!();
        println!("Progress:             {:.1}%", pct);
    }

    Ok(())
}
