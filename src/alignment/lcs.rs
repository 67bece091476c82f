//! Longest-common-subsequence alignment of a reference against a hypothesis.
//!
//! The table is filled bottom-up over suffixes, so `table[i][j]` holds the LCS
//! length of `reference[i..]` and `hypothesis[j..]`. Nothing here recurses,
//! which keeps character-level alignment of long transcripts off the stack.
//!
//! Cost is `O(n·m)` time and space per call. That is fine for sentence-length
//! transcripts and does not scale to paragraph-length or streaming input.

/// Outcome of aligning a reference sequence against a hypothesis sequence.
///
/// All counts are relative to the reference side; swapping the inputs
/// generally changes the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment<T> {
    /// Length of the longest common subsequence
    pub matched_count: usize,
    /// `len(reference) - matched_count`
    pub error_count: usize,
    /// Strictly increasing reference indices that take part in the alignment
    pub matched_indices: Vec<usize>,
    /// Reference elements outside the alignment, in reference order
    pub unmatched: Vec<T>,
}

/// Suffix LCS table stored row-major in a single allocation.
struct LcsTable {
    cols: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    fn build<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Self {
        let rows = reference.len() + 1;
        let cols = hypothesis.len() + 1;
        let mut cells = vec![0u32; rows * cols];

        for i in (0..reference.len()).rev() {
            for j in (0..hypothesis.len()).rev() {
                cells[i * cols + j] = if reference[i] == hypothesis[j] {
                    1 + cells[(i + 1) * cols + j + 1]
                } else {
                    cells[(i + 1) * cols + j].max(cells[i * cols + j + 1])
                };
            }
        }

        Self { cols, cells }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.cols + j]
    }
}

/// Backtracking rule for a mismatch: advance the hypothesis pointer whenever
/// skipping a hypothesis element keeps at least as long a subsequence as
/// skipping a reference element.
///
/// Which reference elements end up reported as unmatched depends on this rule.
#[inline]
pub fn advance_hypothesis_on_tie(lcs_skip_hypothesis: u32, lcs_skip_reference: u32) -> bool {
    lcs_skip_hypothesis >= lcs_skip_reference
}

/// Number of table cells an alignment of the given lengths allocates
pub fn table_cells(reference_len: usize, hypothesis_len: usize) -> usize {
    (reference_len + 1).saturating_mul(hypothesis_len + 1)
}

/// Align `reference` against `hypothesis` and recover the unmatched reference elements.
pub fn align<T: PartialEq + Clone>(reference: &[T], hypothesis: &[T]) -> Alignment<T> {
    let table = LcsTable::build(reference, hypothesis);
    let matched_count = table.get(0, 0) as usize;

    let mut matched_indices = Vec::with_capacity(matched_count);
    let (mut i, mut j) = (0, 0);
    while i < reference.len() && j < hypothesis.len() {
        if reference[i] == hypothesis[j] {
            matched_indices.push(i);
            i += 1;
            j += 1;
        } else if advance_hypothesis_on_tie(table.get(i, j + 1), table.get(i + 1, j)) {
            j += 1;
        } else {
            i += 1;
        }
    }

    let mut unmatched = Vec::with_capacity(reference.len() - matched_indices.len());
    let mut next_match = matched_indices.iter().peekable();
    for (index, element) in reference.iter().enumerate() {
        if next_match.peek() == Some(&&index) {
            next_match.next();
        } else {
            unmatched.push(element.clone());
        }
    }

    Alignment {
        matched_count,
        error_count: reference.len() - matched_count,
        matched_indices,
        unmatched,
    }
}

/// LCS length only, using two rolling rows.
pub fn lcs_length<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> usize {
    let cols = hypothesis.len() + 1;
    let mut next = vec![0u32; cols];
    let mut curr = vec![0u32; cols];

    for i in (0..reference.len()).rev() {
        curr[hypothesis.len()] = 0;
        for j in (0..hypothesis.len()).rev() {
            curr[j] = if reference[i] == hypothesis[j] {
                1 + next[j + 1]
            } else {
                next[j].max(curr[j + 1])
            };
        }
        std::mem::swap(&mut next, &mut curr);
    }

    next[0] as usize
}

/// `len(reference) - lcs_length(reference, hypothesis)`
pub fn error_count<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> usize {
    reference.len() - lcs_length(reference, hypothesis)
}
