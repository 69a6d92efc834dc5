//! Incremental formatting support for Python sources.
//!
//! A formatter that only reformats the lines a user touched needs two
//! things, both provided here:
//!
//! - [`collapse`]: before formatting, every region of the syntax tree that
//!   lies outside the requested line ranges is collapsed into a verbatim
//!   leaf, so the formatter passes it through unchanged.
//! - [`translate`]: after an edit, line ranges expressed against the old
//!   text are mapped onto the new text, widening them where a changed block
//!   swallowed their neighbours.
//!
//! The [`tree`] module holds the concrete syntax tree both operate on, and
//! [`cst`] builds one from Python source with tree-sitter.

#![allow(clippy::similar_names, clippy::items_after_statements)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Concrete syntax tree with parent links and in-place editing.
pub mod tree;

/// Inclusive line ranges and line sets.
pub mod ranges;

/// Collapsing of unchanged regions into verbatim leaves.
pub mod collapse;

/// Translation of line ranges between two versions of a text.
pub mod translate;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Byte offset and line helpers.
pub mod utils;

/// Tree-sitter based parsing into [`tree::Tree`].
pub mod cst;

pub use collapse::{collapse_unchanged, collapse_unchanged_with, CollapseError, CollapseSummary};
pub use config::{Config, ConfigError, DiffAlgorithm, IncrFmtConfig};
pub use ranges::{LineRange, LineRangeError, LineSet};
pub use translate::{adjusted_lines, adjusted_lines_batch, adjusted_lines_with, FilePair};
pub use tree::{NodeId, Symbol, TokenKind, Tree, TreeBuilder, TreeError};
