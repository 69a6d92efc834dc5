//! Stack-based construction of a [`Tree`] in source order.

use super::{Leaf, NodeData, NodeId, Symbol, TokenKind, Tree};

/// Builds a tree top-down, one token at a time.
///
/// ```
/// use incrfmt::tree::{Symbol, TokenKind, TreeBuilder};
///
/// let mut builder = TreeBuilder::new(Symbol::FileInput);
/// builder
///     .start_node(Symbol::SimpleStmt)
///     .token(TokenKind::Keyword, "", "pass", 1)
///     .token(TokenKind::Newline, "", "\n", 1)
///     .finish_node()
///     .token(TokenKind::EndMarker, "", "", 2);
/// let tree = builder.finish();
/// assert_eq!(tree.source(), "pass\n");
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start a tree whose root has the given symbol.
    #[must_use]
    pub fn new(root: Symbol) -> Self {
        let tree = Tree::new(root);
        let stack = vec![tree.root()];
        Self { tree, stack }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.tree.root)
    }

    fn attach(&mut self, child: NodeId) {
        let parent = self.current();
        if let NodeData::Interior { children, .. } = &mut self.tree.slots[parent.index()].data {
            children.push(child);
        }
        self.tree.slots[child.index()].parent = Some(parent);
    }

    /// Open an interior node under the current node.
    pub fn start_node(&mut self, symbol: Symbol) -> &mut Self {
        let id = self.tree.new_node(symbol);
        self.attach(id);
        self.stack.push(id);
        self
    }

    /// Append a leaf to the current node.
    pub fn token(
        &mut self,
        kind: TokenKind,
        prefix: &str,
        value: &str,
        line: usize,
    ) -> &mut Self {
        let id = self.tree.new_leaf(Leaf::new(kind, value, prefix, line));
        self.attach(id);
        self
    }

    /// Close the innermost open node. The root is never closed.
    pub fn finish_node(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// Finish building. Nodes still open are kept as they are.
    #[must_use]
    pub fn finish(self) -> Tree {
        self.tree
    }
}
