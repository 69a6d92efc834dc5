//! Second pass: collapse unchanged "unwrapped lines" one at a time.
//!
//! An unwrapped line is everything up to a NEWLINE token. A statement
//! spanning several physical lines is still a single unwrapped line because
//! the tokenizer only emits NEWLINE at its logical end.

use super::convert::{collapse_node, collapse_nodes, furthest_ancestor_with_last_leaf, misses};
use super::CollapseError;
use crate::ranges::LineSet;
use crate::tree::{NodeId, Symbol, TokenKind, Tree};

/// What a NEWLINE closes.
enum Group {
    /// A whole subtree.
    Node(NodeId),
    /// A run of siblings, possibly led by an `async` token one level up.
    Nodes(Vec<NodeId>),
}

/// Run over every NEWLINE still in the tree and return the number of
/// collapsed lines.
pub(super) fn run(tree: &mut Tree, lines: &LineSet) -> Result<usize, CollapseError> {
    let newlines: Vec<NodeId> = tree
        .leaves(tree.root())
        .into_iter()
        .filter(|leaf| tree.is_token(*leaf, TokenKind::Newline))
        .collect();

    let mut collapsed = 0;
    for newline in newlines {
        // Swallowed by an earlier collapse.
        if !tree.is_attached(newline) {
            continue;
        }
        let Some(parent) = tree.parent(newline) else {
            continue;
        };
        let group = match tree.symbol(parent) {
            Some(Symbol::MatchStmt) => Group::Nodes(match_subject(tree, parent, newline)?),
            Some(Symbol::Suite) => Group::Nodes(suite_header(tree, parent, newline)?),
            _ => Group::Node(statement(tree, newline)),
        };
        let done = match group {
            Group::Node(node) => misses(tree, &[node], lines) && collapse_node(tree, node)?,
            Group::Nodes(nodes) => misses(tree, &nodes, lines) && collapse_nodes(tree, &nodes)?,
        };
        if done {
            collapsed += 1;
        }
    }
    Ok(collapsed)
}

/// `match subject: NEWLINE INDENT case_block+ DEDENT`: the subject is every
/// sibling before the NEWLINE. Case blocks are handled by their own
/// NEWLINEs.
fn match_subject(
    tree: &Tree,
    match_stmt: NodeId,
    newline: NodeId,
) -> Result<Vec<NodeId>, CollapseError> {
    let siblings = tree.children(match_stmt);
    let end = siblings
        .iter()
        .position(|node| *node == newline)
        .unwrap_or(0);
    if end == 0 {
        return Err(CollapseError::EmptyGroup {
            newline,
            context: Symbol::MatchStmt,
        });
    }
    Ok(siblings[..end].to_vec())
}

/// `suite: NEWLINE INDENT stmt+ DEDENT`: the line is the header in front of
/// the suite, back to the previous suite of the same statement (`if`/`elif`
/// and `try`/`except` keep several suites side by side).
fn suite_header(tree: &Tree, suite: NodeId, newline: NodeId) -> Result<Vec<NodeId>, CollapseError> {
    let empty = || CollapseError::EmptyGroup {
        newline,
        context: Symbol::Suite,
    };
    let owner = tree.parent(suite).ok_or_else(empty)?;
    let siblings = tree.children(owner);
    let end = siblings
        .iter()
        .position(|node| *node == suite)
        .ok_or_else(empty)?;
    let start = siblings[..end]
        .iter()
        .rposition(|node| tree.is_symbol(*node, Symbol::Suite))
        .map_or(0, |i| i + 1);
    let mut header = siblings[start..end].to_vec();
    if header.is_empty() {
        return Err(empty());
    }
    if let Some(prev) = tree.prev_sibling(owner) {
        if tree.is_token(prev, TokenKind::Async) {
            header.insert(0, prev);
        }
    }
    Ok(header)
}

/// Any other NEWLINE closes the furthest ancestor it ends. Stacked
/// decorators are taken as one block: their NEWLINEs do not end a
/// statement the way other NEWLINEs do.
fn statement(tree: &Tree, newline: NodeId) -> NodeId {
    let ancestor = furthest_ancestor_with_last_leaf(tree, newline);
    if tree.is_symbol(ancestor, Symbol::Decorator) {
        if let Some(parent) = tree.parent(ancestor) {
            if tree.is_symbol(parent, Symbol::Decorators) {
                return parent;
            }
        }
    }
    ancestor
}
