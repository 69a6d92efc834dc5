//! Side-by-side line mapping between two versions of a text.

use similar::{capture_diff_slices, DiffOp};

use crate::config::DiffAlgorithm;

/// 1-based lines `original_start..=original_end` of the original text map to
/// `modified_start..=modified_end` of the modified text.
///
/// Either side of a changed block may be empty (`start == end + 1`) for pure
/// insertions or deletions. A matching block always has both sides the same
/// non-zero length.
///
/// ```text
///   (1, 1) -> (1, 1)   1. import re          1. import re
///   (2, 3) -> (2, 2)   2. def func(arg1,     2. def func(arg1, arg2, arg3):
///                      3.   arg2, arg3):
///   (4, 4) -> (3, 3)   4.   pass             3.   pass
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinesMapping {
    /// First original line.
    pub original_start: usize,
    /// Last original line, inclusive.
    pub original_end: usize,
    /// First modified line.
    pub modified_start: usize,
    /// Last modified line, inclusive.
    pub modified_end: usize,
    /// Whether the lines differ between both sides.
    pub is_changed_block: bool,
}

impl LinesMapping {
    const fn changed(
        original_start: usize,
        original_end: usize,
        modified_start: usize,
        modified_end: usize,
    ) -> Self {
        Self {
            original_start,
            original_end,
            modified_start,
            modified_end,
            is_changed_block: true,
        }
    }

    /// Whether `line` of the original text falls in this mapping.
    #[must_use]
    pub const fn contains_original(&self, line: usize) -> bool {
        self.original_start <= line && line <= self.original_end
    }

    const fn is_void(&self) -> bool {
        self.original_start > self.original_end && self.modified_start > self.modified_end
    }
}

/// A run of identical lines, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchingBlock {
    original: usize,
    modified: usize,
    len: usize,
}

/// Split keeping terminators, so a missing final newline counts as a change.
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn matching_blocks(
    original: &[&str],
    modified: &[&str],
    algorithm: DiffAlgorithm,
) -> Vec<MatchingBlock> {
    let mut blocks: Vec<MatchingBlock> = Vec::new();
    for op in capture_diff_slices(algorithm.into(), original, modified) {
        let DiffOp::Equal {
            old_index,
            new_index,
            len,
        } = op
        else {
            continue;
        };
        if len == 0 {
            continue;
        }
        match blocks.last_mut() {
            Some(last)
                if last.original + last.len == old_index
                    && last.modified + last.len == new_index =>
            {
                last.len += len;
            }
            _ => blocks.push(MatchingBlock {
                original: old_index,
                modified: new_index,
                len,
            }),
        }
    }
    // Zero-length sentinel at the end of both texts.
    blocks.push(MatchingBlock {
        original: original.len(),
        modified: modified.len(),
        len: 0,
    });
    blocks
}

/// Diff two texts line by line and return the mappings covering both of them
/// in order.
///
/// Matching blocks come from the diff; everything before, between and after
/// them becomes a changed block. Changed blocks with both sides empty are
/// left out, so consecutive mappings always tile `1..=N` of each text.
#[must_use]
pub fn calculate_lines_mappings(
    original: &str,
    modified: &str,
    algorithm: DiffAlgorithm,
) -> Vec<LinesMapping> {
    let original_lines = split_lines(original);
    let modified_lines = split_lines(modified);
    let blocks = matching_blocks(&original_lines, &modified_lines, algorithm);

    let mut mappings = Vec::with_capacity(blocks.len() * 2);
    let mut original_next = 0;
    let mut modified_next = 0;
    for block in blocks {
        let gap = LinesMapping::changed(
            original_next + 1,
            block.original,
            modified_next + 1,
            block.modified,
        );
        if !gap.is_void() {
            mappings.push(gap);
        }
        if block.len > 0 {
            mappings.push(LinesMapping {
                original_start: block.original + 1,
                original_end: block.original + block.len,
                modified_start: block.modified + 1,
                modified_end: block.modified + block.len,
                is_changed_block: false,
            });
        }
        original_next = block.original + block.len;
        modified_next = block.modified + block.len;
    }
    mappings
}
