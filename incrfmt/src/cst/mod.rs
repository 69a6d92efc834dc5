//! Tree-sitter front end producing a [`Tree`](crate::tree::Tree) from Python
//! source.
//!
//! Only available with the `cst` feature (on by default):
//! ```bash
//! cargo build --features cst
//! ```
//!
//! The lowered tree follows the statement grammar the collapser works on:
//! every logical line ends with a NEWLINE leaf, indented bodies are
//! `suite` nodes, and comments live in leaf prefixes. Rendering it with
//! [`Tree::source`](crate::tree::Tree::source) gives back the input byte for
//! byte.

#[cfg(feature = "cst")]
mod lower;
#[cfg(feature = "cst")]
mod parser;

#[cfg(feature = "cst")]
pub use parser::{CstError, CstParser};
