pub mod lcs;

pub use lcs::*;

/// Character sequence of a transcript (Unicode scalar values)
pub fn char_sequence(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Word sequence of a transcript, split on single spaces.
///
/// Consecutive spaces produce empty tokens and an empty text is one empty token,
/// so the word count of a non-trimmed text includes those gaps.
pub fn word_sequence(text: &str) -> Vec<&str> {
    text.split(' ').collect()
}

/// Character- and word-level scores for one reference/hypothesis pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairScore {
    /// Reference length in characters
    pub total_characters: usize,
    /// Reference length in words
    pub total_words: usize,
    /// CER numerator
    pub char_errors: usize,
    /// WER numerator
    pub word_errors: usize,
    /// Reference characters outside the character alignment, in order
    pub missed_characters: Vec<char>,
}

impl PairScore {
    /// Score `hypothesis` against `reference` at both granularities
    pub fn compute(reference: &str, hypothesis: &str) -> Self {
        let reference_chars = char_sequence(reference);
        let hypothesis_chars = char_sequence(hypothesis);
        let chars = align(&reference_chars, &hypothesis_chars);

        let reference_words = word_sequence(reference);
        let hypothesis_words = word_sequence(hypothesis);
        let word_errors = error_count(&reference_words, &hypothesis_words);

        Self {
            total_characters: reference_chars.len(),
            total_words: reference_words.len(),
            char_errors: chars.error_count,
            word_errors,
            missed_characters: chars.unmatched,
        }
    }

    pub fn cer(&self) -> Option<f64> {
        rate(self.char_errors, self.total_characters)
    }

    pub fn wer(&self) -> Option<f64> {
        rate(self.word_errors, self.total_words)
    }

    /// Size of the largest table the character alignment allocates
    pub fn char_table_cells(reference: &str, hypothesis: &str) -> usize {
        table_cells(reference.chars().count(), hypothesis.chars().count())
    }
}

/// `errors / total`, `None` when there is nothing to normalize by
pub fn rate(errors: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| errors as f64 / total as f64)
}
