//! Arena-backed concrete syntax tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! Every node records its parent, so upward walks ("furthest ancestor that
//! ends with this leaf") and sibling lookups are index hops instead of
//! reference-counted back pointers.
//!
//! Removal detaches a node but never frees its slot: ids handed out earlier
//! stay valid, and a detached subtree can still be rendered to text.

mod builder;
mod kind;

pub use builder::TreeBuilder;
pub use kind::{Symbol, TokenKind};

use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt;

/// Stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A token together with the trivia in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Token kind.
    pub kind: TokenKind,
    /// Exact token text.
    pub value: CompactString,
    /// Whitespace, comments and continuation lines preceding the token.
    pub prefix: CompactString,
    /// 1-based line on which the token starts.
    pub line: usize,
}

impl Leaf {
    /// Create a leaf.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        value: impl Into<CompactString>,
        prefix: impl Into<CompactString>,
        line: usize,
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            prefix: prefix.into(),
            line,
        }
    }

    /// Last line occupied by the token itself.
    ///
    /// Multi-line tokens (triple-quoted strings, verbatim blocks) end
    /// `value.count('\n')` lines after they start. A NEWLINE token ends on the
    /// line it terminates. The prefix is never counted.
    #[must_use]
    pub fn end_line(&self) -> usize {
        if self.kind == TokenKind::Newline {
            self.line
        } else {
            self.line + bytecount_newlines(&self.value)
        }
    }
}

fn bytecount_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// A token.
    Leaf(Leaf),
    /// A grammar node with ordered children.
    Interior {
        /// Grammar symbol.
        symbol: Symbol,
        /// Owned children, in source order.
        children: SmallVec<[NodeId; 4]>,
    },
}

#[derive(Debug, Clone)]
struct Slot {
    parent: Option<NodeId>,
    data: NodeData,
}

/// Error raised by structural tree edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Children can only be attached to interior nodes.
    #[error("node {0} is a leaf and cannot take children")]
    NotInterior(NodeId),
    /// A node can only have one parent.
    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),
    /// The root cannot be moved under another node.
    #[error("the root node {0} cannot be attached")]
    AttachRoot(NodeId),
    /// Attaching the node would make it its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle {
        /// Intended parent.
        parent: NodeId,
        /// Node being attached.
        child: NodeId,
    },
    /// Insertion index past the end of the child list.
    #[error("index {index} out of bounds for {parent} with {len} children")]
    IndexOutOfBounds {
        /// Intended parent.
        parent: NodeId,
        /// Requested index.
        index: usize,
        /// Current number of children.
        len: usize,
    },
}

/// A mutable concrete syntax tree.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only an empty root node.
    #[must_use]
    pub fn new(root: Symbol) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.new_node(root);
        tree
    }

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of allocated nodes, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.index()]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(Slot { parent: None, data });
        id
    }

    /// Allocate a detached leaf.
    pub fn new_leaf(&mut self, leaf: Leaf) -> NodeId {
        self.push(NodeData::Leaf(leaf))
    }

    /// Allocate a detached interior node with no children.
    pub fn new_node(&mut self, symbol: Symbol) -> NodeId {
        self.push(NodeData::Interior {
            symbol,
            children: SmallVec::new(),
        })
    }

    /// Node payload.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slot(id).data
    }

    /// Parent of `id`, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// Children of `id`; empty for leaves.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.slot(id).data {
            NodeData::Interior { children, .. } => children.as_slice(),
            NodeData::Leaf(_) => &[],
        }
    }

    /// Leaf payload, `None` for interior nodes.
    #[must_use]
    pub fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        match &self.slot(id).data {
            NodeData::Leaf(leaf) => Some(leaf),
            NodeData::Interior { .. } => None,
        }
    }

    /// Mutable leaf payload, `None` for interior nodes.
    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut Leaf> {
        match &mut self.slots[id.index()].data {
            NodeData::Leaf(leaf) => Some(leaf),
            NodeData::Interior { .. } => None,
        }
    }

    /// Grammar symbol, `None` for leaves.
    #[must_use]
    pub fn symbol(&self, id: NodeId) -> Option<Symbol> {
        match &self.slot(id).data {
            NodeData::Interior { symbol, .. } => Some(*symbol),
            NodeData::Leaf(_) => None,
        }
    }

    /// Token kind, `None` for interior nodes.
    #[must_use]
    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        self.leaf(id).map(|leaf| leaf.kind)
    }

    /// Whether `id` is a leaf of the given kind.
    #[must_use]
    pub fn is_token(&self, id: NodeId, kind: TokenKind) -> bool {
        self.token_kind(id) == Some(kind)
    }

    /// Whether `id` is an interior node with the given symbol.
    #[must_use]
    pub fn is_symbol(&self, id: NodeId, symbol: Symbol) -> bool {
        self.symbol(id) == Some(symbol)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    /// Fails if `parent` is a leaf, `child` already has a parent, or the edit
    /// would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` among the children of `parent`.
    ///
    /// # Errors
    /// Fails if `parent` is a leaf, `child` already has a parent or is the
    /// root, the index is past the end, or the edit would create a cycle.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        if child == self.root {
            return Err(TreeError::AttachRoot(child));
        }
        if self.slot(child).parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(TreeError::Cycle { parent, child });
            }
            cursor = self.slot(node).parent;
        }
        match &mut self.slots[parent.index()].data {
            NodeData::Interior { children, .. } => {
                if index > children.len() {
                    return Err(TreeError::IndexOutOfBounds {
                        parent,
                        index,
                        len: children.len(),
                    });
                }
                children.insert(index, child);
            }
            NodeData::Leaf(_) => return Err(TreeError::NotInterior(parent)),
        }
        self.slots[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Detach `id` from its parent and return the index it occupied.
    ///
    /// Returns `None` when the node has no parent.
    pub fn remove(&mut self, id: NodeId) -> Option<usize> {
        let parent = self.slot(id).parent?;
        let index = match &mut self.slots[parent.index()].data {
            NodeData::Interior { children, .. } => {
                let index = children.iter().position(|c| *c == id)?;
                children.remove(index);
                index
            }
            NodeData::Leaf(_) => return None,
        };
        self.slots[id.index()].parent = None;
        Some(index)
    }

    fn sibling_offset(&self, id: NodeId, forward: bool) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == id)?;
        if forward {
            siblings.get(index + 1).copied()
        } else {
            index.checked_sub(1).map(|i| siblings[i])
        }
    }

    /// Sibling immediately before `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, false)
    }

    /// Sibling immediately after `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, true)
    }

    /// Leftmost leaf of the subtree, `None` if it holds no leaves.
    #[must_use]
    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut node = id;
        loop {
            match &self.slot(node).data {
                NodeData::Leaf(_) => return Some(node),
                NodeData::Interior { children, .. } => node = *children.first()?,
            }
        }
    }

    /// Rightmost leaf of the subtree, `None` if it holds no leaves.
    #[must_use]
    pub fn last_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut node = id;
        loop {
            match &self.slot(node).data {
                NodeData::Leaf(_) => return Some(node),
                NodeData::Interior { children, .. } => node = *children.last()?,
            }
        }
    }

    /// All nodes of the subtree in pre-order, `id` first.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Leaves of the subtree in source order.
    #[must_use]
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.leaf(*node).is_some())
            .collect()
    }

    /// Whether `id` is the root or hangs below it.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            node = parent;
        }
        node == self.root
    }

    /// Append the source text of a run of nodes to `out`.
    ///
    /// Leaves contribute `prefix + value`. A verbatim leaf carries its text
    /// without the line terminator it replaced, so one `'\n'` is written after
    /// it unless the next leaf of the run is a NEWLINE or there is no next
    /// leaf.
    pub fn write_text(&self, nodes: &[NodeId], out: &mut String) {
        let leaves: Vec<&Leaf> = nodes
            .iter()
            .flat_map(|node| self.leaves(*node))
            .filter_map(|id| self.leaf(id))
            .collect();
        for (i, leaf) in leaves.iter().enumerate() {
            out.push_str(&leaf.prefix);
            out.push_str(&leaf.value);
            if leaf.kind == TokenKind::Verbatim {
                if let Some(next) = leaves.get(i + 1) {
                    if next.kind != TokenKind::Newline {
                        out.push('\n');
                    }
                }
            }
        }
    }

    /// Source text of the subtree, prefixes included.
    ///
    /// For a tree without verbatim leaves this is exactly the parsed text.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_text(&[id], &mut out);
        out
    }

    /// Exact source text of the whole tree.
    #[must_use]
    pub fn source(&self) -> String {
        self.text(self.root)
    }

    /// Inclusive line span covered by a run of sibling nodes.
    ///
    /// Runs from the first leaf of the first node to the end line of the last
    /// leaf of the last node; `None` when either end has no leaves.
    #[must_use]
    pub fn line_span(&self, nodes: &[NodeId]) -> Option<(usize, usize)> {
        let first = self.first_leaf(*nodes.first()?)?;
        let last = self.last_leaf(*nodes.last()?)?;
        let start = self.leaf(first)?.line;
        let end = self.leaf(last)?.end_line();
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_statement_tree() -> Tree {
        let mut builder = TreeBuilder::new(Symbol::FileInput);
        builder
            .start_node(Symbol::SimpleStmt)
            .token(TokenKind::Name, "", "x", 1)
            .token(TokenKind::Newline, "", "\n", 1)
            .finish_node()
            .start_node(Symbol::SimpleStmt)
            .token(TokenKind::Name, "# c\n", "y", 3)
            .token(TokenKind::Newline, "  ", "\n", 3)
            .finish_node()
            .token(TokenKind::EndMarker, "", "", 4);
        builder.finish()
    }

    #[test]
    fn test_source_round_trip() {
        let tree = two_statement_tree();
        assert_eq!(tree.source(), "x\n# c\ny  \n");
    }

    #[test]
    fn test_first_and_last_leaf() {
        let tree = two_statement_tree();
        let second = tree.children(tree.root())[1];
        let first = tree.first_leaf(second).unwrap();
        let last = tree.last_leaf(second).unwrap();
        assert_eq!(tree.leaf(first).unwrap().value, "y");
        assert!(tree.is_token(last, TokenKind::Newline));
    }

    #[test]
    fn test_remove_and_insert_restore_order() {
        let mut tree = two_statement_tree();
        let root = tree.root();
        let first = tree.children(root)[0];
        let index = tree.remove(first).unwrap();
        assert_eq!(index, 0);
        assert!(tree.parent(first).is_none());
        assert!(!tree.is_attached(first));
        assert_eq!(tree.children(root).len(), 2);

        tree.insert_child(root, index, first).unwrap();
        assert_eq!(tree.children(root)[0], first);
        assert_eq!(tree.source(), "x\n# c\ny  \n");
    }

    #[test]
    fn test_remove_detached_returns_none() {
        let mut tree = two_statement_tree();
        let orphan = tree.new_node(Symbol::SimpleStmt);
        assert_eq!(tree.remove(orphan), None);
    }

    #[test]
    fn test_insert_rejects_bad_edits() {
        let mut tree = two_statement_tree();
        let root = tree.root();
        let stmt = tree.children(root)[0];
        let leaf = tree.first_leaf(stmt).unwrap();

        assert_eq!(
            tree.append_child(root, stmt),
            Err(TreeError::AlreadyAttached(stmt))
        );
        let orphan = tree.new_node(Symbol::Other("atom"));
        assert_eq!(
            tree.append_child(leaf, orphan),
            Err(TreeError::NotInterior(leaf))
        );
        assert_eq!(
            tree.insert_child(root, 9, orphan),
            Err(TreeError::IndexOutOfBounds {
                parent: root,
                index: 9,
                len: 3
            })
        );
        assert_eq!(
            tree.append_child(orphan, root),
            Err(TreeError::AttachRoot(root))
        );

        let inner = tree.new_node(Symbol::Other("inner"));
        tree.append_child(orphan, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, orphan),
            Err(TreeError::Cycle {
                parent: inner,
                child: orphan
            })
        );
    }

    #[test]
    fn test_siblings() {
        let tree = two_statement_tree();
        let children = tree.children(tree.root()).to_vec();
        assert_eq!(tree.prev_sibling(children[0]), None);
        assert_eq!(tree.next_sibling(children[0]), Some(children[1]));
        assert_eq!(tree.prev_sibling(children[2]), Some(children[1]));
        assert_eq!(tree.next_sibling(children[2]), None);
    }

    #[test]
    fn test_line_span_ignores_prefix_newlines() {
        let tree = two_statement_tree();
        let second = tree.children(tree.root())[1];
        assert_eq!(tree.line_span(&[second]), Some((3, 3)));
        let both = &tree.children(tree.root())[..2];
        assert_eq!(tree.line_span(both), Some((1, 3)));
    }

    #[test]
    fn test_line_span_of_multiline_token() {
        let leaf = Leaf::new(TokenKind::String, "'''a\nb\nc'''", "", 5);
        assert_eq!(leaf.end_line(), 7);
        let newline = Leaf::new(TokenKind::Newline, "\n", "", 5);
        assert_eq!(newline.end_line(), 5);
    }

    #[test]
    fn test_line_span_of_empty_node() {
        let mut tree = Tree::new(Symbol::FileInput);
        let empty = tree.new_node(Symbol::Suite);
        assert_eq!(tree.line_span(&[empty]), None);
        assert_eq!(tree.line_span(&[]), None);
    }
}
