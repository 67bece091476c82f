pub mod alignment;
pub mod batch;
pub mod error;
pub mod io;
pub mod models;

pub use alignment::{Alignment, PairScore, align, error_count, lcs_length};
pub use batch::{
    BatchOutcome, CorpusStatus, CorpusSummary, EvaluatorConfig, corpus_status, evaluate_corpus,
    summarize_report, write_summary_json,
};
pub use error::{ExtractError, LoadError};
pub use io::{LoaderConfig, TextEncoding, extract_sentence, load_reference, match_directories};
pub use models::{CorpusRow, SttResponse};
