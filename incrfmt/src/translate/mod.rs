//! Translate line ranges from an original text onto a modified one.
//!
//! Formatting only a few lines can still touch their neighbours:
//!
//! ```text
//! 1. def my_func(arg1, arg2,          1. def my_func(
//! 2.             arg3,):              2.     arg1,
//! 3.   pass                           3.     arg2,
//!                                     4.     arg3,
//!                                     5. ):
//!                                     6.   pass
//! ```
//!
//! Asking for line 2 alone forces line 1 to be reformatted as well. A range
//! that lands in a changed block is therefore widened to the whole block on
//! the modified side, while a range inside unchanged lines is just shifted.

mod mapping;

pub use mapping::{calculate_lines_mappings, LinesMapping};

use rayon::prelude::*;

use crate::config::DiffAlgorithm;
use crate::ranges::LineRange;

/// One file to translate ranges for.
#[derive(Debug, Clone, Copy)]
pub struct FilePair<'a> {
    /// Ranges in `original` numbering.
    pub lines: &'a [LineRange],
    /// Text before the edit.
    pub original: &'a str,
    /// Text after the edit.
    pub modified: &'a str,
}

/// Map `lines` of `original` onto `modified` using the default diff.
///
/// The result is sorted. Invalid ranges and ranges with an endpoint past the
/// end of `original` are left out, as are ranges that would run backwards
/// once translated (a range made only of deleted lines).
#[must_use]
pub fn adjusted_lines(lines: &[LineRange], original: &str, modified: &str) -> Vec<LineRange> {
    adjusted_lines_with(lines, original, modified, DiffAlgorithm::default())
}

/// [`adjusted_lines`] with an explicit diff algorithm.
#[must_use]
pub fn adjusted_lines_with(
    lines: &[LineRange],
    original: &str,
    modified: &str,
    algorithm: DiffAlgorithm,
) -> Vec<LineRange> {
    let mappings = calculate_lines_mappings(original, modified, algorithm);

    let mut sorted: Vec<LineRange> = lines
        .iter()
        .copied()
        .filter(|range| {
            let valid = range.is_valid();
            if !valid {
                tracing::debug!(%range, "dropping backwards line range");
            }
            valid
        })
        .collect();
    sorted.sort_unstable();

    let mut adjusted = Vec::with_capacity(sorted.len());
    // Both the ranges and the mappings are sorted: lookups never go back.
    let mut cursor = 0;
    for range in sorted {
        let Some(start_index) = find_mapping(&mappings, range.start, cursor) else {
            tracing::debug!(%range, "range start outside the original text");
            continue;
        };
        cursor = start_index;
        let Some(end_index) = find_mapping(&mappings, range.end, start_index) else {
            tracing::debug!(%range, "range end outside the original text");
            continue;
        };

        let start_mapping = &mappings[start_index];
        let end_mapping = &mappings[end_index];
        let start = if start_mapping.is_changed_block {
            start_mapping.modified_start
        } else {
            range.start - start_mapping.original_start + start_mapping.modified_start
        };
        let end = if end_mapping.is_changed_block {
            end_mapping.modified_end
        } else {
            range.end - end_mapping.original_start + end_mapping.modified_start
        };

        let translated = LineRange::new(start, end);
        if translated.is_valid() {
            adjusted.push(translated);
        } else {
            tracing::debug!(%range, "range only covers deleted lines");
        }
    }
    adjusted
}

/// Translate many independent files in parallel, keeping input order.
#[must_use]
pub fn adjusted_lines_batch(
    pairs: &[FilePair<'_>],
    algorithm: DiffAlgorithm,
) -> Vec<Vec<LineRange>> {
    pairs
        .par_iter()
        .map(|pair| adjusted_lines_with(pair.lines, pair.original, pair.modified, algorithm))
        .collect()
}

fn find_mapping(mappings: &[LinesMapping], line: usize, from: usize) -> Option<usize> {
    mappings
        .iter()
        .skip(from)
        .position(|mapping| mapping.contains_original(line))
        .map(|offset| from + offset)
}
