//! In-place replacement of subtrees by verbatim leaves.

use compact_str::CompactString;

use super::CollapseError;
use crate::ranges::LineSet;
use crate::tree::{Leaf, NodeId, TokenKind, Tree};

/// Whether the combined span of `nodes` stays clear of every kept line.
///
/// A run without leaves has no span and is reported as missing the set, so
/// the collapse that follows surfaces the broken tree as an error.
pub(super) fn misses(tree: &Tree, nodes: &[NodeId], lines: &LineSet) -> bool {
    tree.line_span(nodes)
        .map_or(true, |(start, end)| !lines.intersects(start, end))
}

/// Furthest ancestor whose last leaf is `leaf`.
pub(super) fn furthest_ancestor_with_last_leaf(tree: &Tree, leaf: NodeId) -> NodeId {
    let mut node = leaf;
    while let Some(parent) = tree.parent(node) {
        if tree.children(parent).last() != Some(&node) {
            break;
        }
        node = parent;
    }
    node
}

/// Whether the subtree already holds a verbatim leaf.
pub(super) fn contains_verbatim(tree: &Tree, node: NodeId) -> bool {
    tree.leaves(node)
        .into_iter()
        .any(|leaf| tree.is_token(leaf, TokenKind::Verbatim))
}

/// Replace `node` by a single verbatim leaf.
///
/// Returns `Ok(false)` when the node is already detached.
pub(super) fn collapse_node(tree: &mut Tree, node: NodeId) -> Result<bool, CollapseError> {
    let Some(parent) = tree.parent(node) else {
        return Ok(false);
    };
    let (Some(first), Some(last)) = (tree.first_leaf(node), tree.last_leaf(node)) else {
        return Err(CollapseError::EmptySpan(node));
    };
    if first == last {
        return Err(CollapseError::SingleLeaf(node));
    }
    replace(tree, parent, &[node], first)?;
    Ok(true)
}

/// Replace a run of nodes by a single verbatim leaf placed where the first
/// one was, under the first node's parent.
///
/// Returns `Ok(false)` when the first node is already detached.
pub(super) fn collapse_nodes(tree: &mut Tree, nodes: &[NodeId]) -> Result<bool, CollapseError> {
    let Some(&head) = nodes.first() else {
        return Ok(false);
    };
    let Some(parent) = tree.parent(head) else {
        return Ok(false);
    };
    let Some(first) = tree.first_leaf(head) else {
        return Err(CollapseError::EmptySpan(head));
    };
    replace(tree, parent, nodes, first)?;
    Ok(true)
}

fn replace(
    tree: &mut Tree,
    parent: NodeId,
    nodes: &[NodeId],
    first: NodeId,
) -> Result<(), CollapseError> {
    // The prefix holds comments and indentation; the renderer re-indents it,
    // so it stays outside the verbatim value.
    let (prefix, line) = match tree.leaf_mut(first) {
        Some(leaf) => (std::mem::take(&mut leaf.prefix), leaf.line),
        None => return Err(CollapseError::EmptySpan(nodes[0])),
    };

    let mut value = String::new();
    tree.write_text(nodes, &mut value);
    strip_line_terminator(&mut value);

    let mut index = None;
    for node in nodes {
        let removed = tree.remove(*node);
        if index.is_none() {
            index = removed;
        }
    }
    let Some(index) = index else {
        return Err(CollapseError::EmptySpan(nodes[0]));
    };

    tracing::trace!(
        node = %nodes[0],
        count = nodes.len(),
        line,
        "collapsing into verbatim leaf"
    );
    let verbatim = tree.new_leaf(Leaf::new(
        TokenKind::Verbatim,
        CompactString::from(value),
        prefix,
        line,
    ));
    tree.insert_child(parent, index, verbatim)?;
    Ok(())
}

/// Drop one trailing `\n` or `\r\n`; the renderer appends it back.
fn strip_line_terminator(value: &mut String) {
    if value.ends_with("\r\n") {
        value.truncate(value.len() - 2);
    } else if value.ends_with('\n') {
        value.truncate(value.len() - 1);
    }
}
