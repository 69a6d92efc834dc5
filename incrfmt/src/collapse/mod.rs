//! Collapse regions outside the requested line ranges into verbatim leaves.
//!
//! The idea mirrors how `# fmt: off` regions are handled: every subtree that
//! does not touch a kept line is replaced by a single
//! [`TokenKind::Verbatim`] leaf holding its original text, which the renderer
//! emits as-is with only its prefix normalized.
//!
//! Two passes run in order:
//!
//! 1. Top-level statements whose span misses the kept lines are collapsed
//!    whole. This is a shortcut for large unchanged definitions.
//! 2. Every remaining unwrapped line (everything up to a NEWLINE token) is
//!    checked and collapsed on its own.
//!
//! Lines reached only by the second pass still get their prefix (comments
//! and indentation) normalized, since the prefix lives outside the verbatim
//! value. Keeping those bytes too would need more of the work moved into the
//! first pass, which is hard to get right with inconsistent indentation.

mod convert;
mod line_by_line;
mod top_level;

use crate::config::IncrFmtConfig;
use crate::ranges::{LineRange, LineSet};
use crate::tree::{NodeId, Symbol, TokenKind, Tree, TreeError};

/// Contract violation found while collapsing.
///
/// None of these can happen on a tree produced by a correct parser; they
/// abort the collapse instead of leaving a corrupted tree behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollapseError {
    /// A simple statement must end with a NEWLINE token.
    #[error("simple statement {node} ends with {found:?} instead of a NEWLINE")]
    MissingNewline {
        /// The statement.
        node: NodeId,
        /// Kind of its actual last leaf.
        found: Option<TokenKind>,
    },
    /// The collapse target has no leaves.
    #[error("node {0} has no leaves to collapse")]
    EmptySpan(NodeId),
    /// The collapse target is a lone token, not a subtree.
    #[error("node {0} is a single leaf, expected a subtree")]
    SingleLeaf(NodeId),
    /// No header in front of a NEWLINE that needs one.
    #[error("nothing precedes NEWLINE {newline} in its {context}")]
    EmptyGroup {
        /// The NEWLINE token.
        newline: NodeId,
        /// The node the header was expected in.
        context: Symbol,
    },
    /// A structural edit failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// How many regions each pass replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Statements collapsed by the top-level pass.
    pub top_level: usize,
    /// Unwrapped lines collapsed by the line-by-line pass.
    pub line_by_line: usize,
}

impl CollapseSummary {
    /// Total number of verbatim leaves inserted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.top_level + self.line_by_line
    }
}

/// Collapse everything outside `lines` into verbatim leaves, in place.
///
/// # Errors
/// Returns a [`CollapseError`] when the tree breaks a structural contract
/// (see the variants). The tree may then hold the collapses done so far but
/// never a half-applied one.
pub fn collapse_unchanged(
    tree: &mut Tree,
    lines: &[LineRange],
) -> Result<CollapseSummary, CollapseError> {
    collapse_unchanged_with(tree, lines, &IncrFmtConfig::default())
}

/// [`collapse_unchanged`] with explicit configuration.
///
/// # Errors
/// Same as [`collapse_unchanged`].
pub fn collapse_unchanged_with(
    tree: &mut Tree,
    lines: &[LineRange],
    config: &IncrFmtConfig,
) -> Result<CollapseSummary, CollapseError> {
    let lines_set = LineSet::from_ranges(lines);
    let mut summary = CollapseSummary::default();
    if config.top_level_pass {
        summary.top_level = top_level::TopLevelPass::new(&lines_set).run(tree)?;
    }
    summary.line_by_line = line_by_line::run(tree, &lines_set)?;
    tracing::debug!(
        kept_lines = lines_set.len(),
        top_level = summary.top_level,
        line_by_line = summary.line_by_line,
        "collapsed unchanged regions"
    );
    Ok(summary)
}
