//! First pass: collapse whole statements that sit outside the kept lines.
//!
//! Only statement-level nodes are inspected. Once a `simple_stmt` or a
//! `suite` is reached the walk does not go below it, so a large unchanged
//! class costs one span check instead of one per line.

use super::convert::{
    collapse_node, contains_verbatim, furthest_ancestor_with_last_leaf, misses,
};
use super::CollapseError;
use crate::ranges::LineSet;
use crate::tree::{NodeId, Symbol, TokenKind, Tree};

pub(super) struct TopLevelPass<'a> {
    lines: &'a LineSet,
    collapsed: usize,
}

impl<'a> TopLevelPass<'a> {
    pub(super) fn new(lines: &'a LineSet) -> Self {
        Self {
            lines,
            collapsed: 0,
        }
    }

    /// Run over the whole tree and return the number of collapsed nodes.
    pub(super) fn run(mut self, tree: &mut Tree) -> Result<usize, CollapseError> {
        self.visit(tree, tree.root())?;
        Ok(self.collapsed)
    }

    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), CollapseError> {
        match tree.symbol(node) {
            Some(Symbol::SimpleStmt) => self.visit_simple_stmt(tree, node),
            Some(Symbol::Suite) => self.visit_suite(tree, node),
            Some(_) => {
                // Children are snapshotted: collapsing one of them rewrites
                // the parent's child list in place.
                let children = tree.children(node).to_vec();
                for child in children {
                    self.visit(tree, child)?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn visit_simple_stmt(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), CollapseError> {
        let Some(newline) = tree.last_leaf(node) else {
            return Ok(());
        };
        if !tree.is_token(newline, TokenKind::Newline) {
            return Err(CollapseError::MissingNewline {
                node,
                found: tree.token_kind(newline),
            });
        }
        // A one-line body like `if cond: pass` has no suite of its own; the
        // whole compound statement ends with this NEWLINE.
        let ancestor = furthest_ancestor_with_last_leaf(tree, newline);
        if misses(tree, &[ancestor], self.lines) && collapse_node(tree, ancestor)? {
            self.collapsed += 1;
        }
        Ok(())
    }

    fn visit_suite(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), CollapseError> {
        // Verbatim regions from fmt:off/skip markers cannot be serialized
        // back into a larger verbatim block.
        if contains_verbatim(tree, node) {
            return Ok(());
        }
        let Some(mut semantic_parent) = tree.parent(node) else {
            return Ok(());
        };
        // `async` hangs one level above the statement it modifies.
        if let Some(prev) = tree.prev_sibling(semantic_parent) {
            if tree.is_token(prev, TokenKind::Async) {
                match tree.parent(semantic_parent) {
                    Some(grandparent) => semantic_parent = grandparent,
                    None => return Ok(()),
                }
            }
        }
        if misses(tree, &[semantic_parent], self.lines) && collapse_node(tree, semantic_parent)? {
            self.collapsed += 1;
        }
        Ok(())
    }
}
