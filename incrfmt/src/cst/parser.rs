//! Tree-sitter based parser producing the collapsible [`Tree`].

use tree_sitter::{Node, Parser};

use super::lower::Lowering;
use crate::tree::Tree;

/// Error during CST parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CstError {
    /// The Python grammar could not be loaded.
    #[error("failed to create CST parser: {0}")]
    ParserCreation(String),
    /// tree-sitter gave up without producing a tree.
    #[error("failed to parse source as Python")]
    ParseFailed,
    /// The source is not valid Python.
    #[error("syntax error on line {line}")]
    Syntax {
        /// 1-based line of the first error node.
        line: usize,
    },
}

/// Tree-sitter based CST parser.
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for Python.
    ///
    /// # Errors
    /// Returns error if the grammar cannot be loaded.
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse `source` into a tree whose [`Tree::source`] is `source` again.
    ///
    /// # Errors
    /// Returns [`CstError::Syntax`] for invalid Python; partial trees from
    /// tree-sitter's error recovery are never lowered.
    pub fn parse(&mut self, source: &str) -> Result<Tree, CstError> {
        let parsed = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;
        let root = parsed.root_node();
        if root.has_error() {
            let line = first_error(root).map_or(1, |node| node.start_position().row + 1);
            tracing::debug!(line, "source has syntax errors");
            return Err(CstError::Syntax { line });
        }
        let tree = Lowering::new(source).lower(root);
        tracing::trace!(nodes = tree.node_count(), "lowered tree-sitter parse");
        Ok(tree)
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    (0..node.child_count())
        .filter_map(|i| node.child(i as u32))
        .filter(|child| child.has_error())
        .find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeId, Symbol, TokenKind};

    fn parse(source: &str) -> Tree {
        let mut parser = CstParser::new().unwrap();
        parser.parse(source).unwrap()
    }

    fn symbols(tree: &Tree, node: NodeId) -> Vec<Option<Symbol>> {
        tree.children(node)
            .iter()
            .map(|child| tree.symbol(*child))
            .collect()
    }

    fn kinds(tree: &Tree, node: NodeId) -> Vec<Option<TokenKind>> {
        tree.children(node)
            .iter()
            .map(|child| tree.token_kind(*child))
            .collect()
    }

    #[test]
    fn test_round_trip() {
        let sources = [
            "",
            "x = 1",
            "x = 1\n",
            "# only a comment\n",
            "x = 1; y = 2;  # trailing\nz = 3\n",
            "import os\r\n\r\ndef f():\r\n    return os.sep\r\n",
            "def f(a,\n      b):\n    '''doc\n    string'''\n    return (a +\n            b)\n",
            "if x: pass\nelif y: pass\nelse:\n    # comment\n    pass\n",
            "try:\n    a()\nexcept ValueError as e:\n    b(e)\nelse:\n    c()\nfinally:\n    d()\n",
            "@a\n@b.c(1)\n# between\ndef f(): pass\n",
            "class A(B):\n    x = 1\n\n    async def f(self):\n        async with g() as h:\n            pass\n",
            "match p:\n    case [x, y] if x > y:\n        pass\n    case _:\n        pass\n",
            "total = 1 + \\\n    2\n",
            "for i in range(3):\n    pass\nelse:\n    pass\n\n\n",
        ];
        for source in sources {
            assert_eq!(parse(source).source(), source, "{source:?}");
        }
    }

    #[test]
    fn test_simple_statements_share_one_newline() {
        let tree = parse("x = 1; y = 2\nz = 3\n");
        let root = tree.root();
        assert_eq!(
            symbols(&tree, root),
            vec![Some(Symbol::SimpleStmt), Some(Symbol::SimpleStmt), None]
        );
        let first = tree.children(root)[0];
        let newline = tree.last_leaf(first).unwrap();
        assert!(tree.is_token(newline, TokenKind::Newline));
        assert_eq!(tree.line_span(&[first]), Some((1, 1)));
        assert_eq!(tree.text(first), "x = 1; y = 2\n");
    }

    #[test]
    fn test_missing_final_newline_gives_empty_newline() {
        let tree = parse("x = 1");
        let stmt = tree.children(tree.root())[0];
        let newline = tree.leaf(tree.last_leaf(stmt).unwrap()).unwrap();
        assert_eq!(newline.kind, TokenKind::Newline);
        assert_eq!(newline.value, "");
        assert_eq!(newline.line, 1);
    }

    #[test]
    fn test_crlf_newline() {
        let tree = parse("x = 1  # c\r\n");
        let stmt = tree.children(tree.root())[0];
        let newline = tree.leaf(tree.last_leaf(stmt).unwrap()).unwrap();
        assert_eq!(newline.value, "\r\n");
        assert_eq!(newline.prefix, "  # c");
    }

    #[test]
    fn test_indented_body_is_a_suite() {
        let tree = parse("def f():\n    x = 1\n    return x\n");
        let funcdef = tree.children(tree.root())[0];
        assert!(tree.is_symbol(funcdef, Symbol::Funcdef));

        let suite = *tree.children(funcdef).last().unwrap();
        assert!(tree.is_symbol(suite, Symbol::Suite));
        assert_eq!(
            kinds(&tree, suite),
            vec![
                Some(TokenKind::Newline),
                Some(TokenKind::Indent),
                None,
                None,
                Some(TokenKind::Dedent),
            ]
        );
        let dedent = tree.leaf(tree.last_leaf(suite).unwrap()).unwrap();
        assert_eq!(dedent.line, 3);
        assert_eq!(tree.line_span(&[funcdef]), Some((1, 3)));
    }

    #[test]
    fn test_inline_bodies_and_clauses_are_flattened() {
        let tree = parse("if x: pass\nelse: y = 1\n");
        let if_stmt = tree.children(tree.root())[0];
        assert!(tree.is_symbol(if_stmt, Symbol::IfStmt));
        let stmts: Vec<_> = tree
            .children(if_stmt)
            .iter()
            .filter(|child| tree.is_symbol(**child, Symbol::SimpleStmt))
            .collect();
        assert_eq!(stmts.len(), 2);
        assert!(!tree
            .children(if_stmt)
            .iter()
            .any(|child| tree.is_symbol(*child, Symbol::Suite)));
    }

    #[test]
    fn test_try_clauses_keep_their_suites_side_by_side() {
        let tree = parse("try:\n    a()\nexcept E:\n    b()\nfinally:\n    c()\n");
        let try_stmt = tree.children(tree.root())[0];
        assert!(tree.is_symbol(try_stmt, Symbol::TryStmt));
        let suites = tree
            .children(try_stmt)
            .iter()
            .filter(|child| tree.is_symbol(**child, Symbol::Suite))
            .count();
        assert_eq!(suites, 3);
    }

    #[test]
    fn test_decorators() {
        let tree = parse("@a\n@b\ndef f():\n    pass\n");
        let decorated = tree.children(tree.root())[0];
        assert_eq!(
            symbols(&tree, decorated),
            vec![Some(Symbol::Decorators), Some(Symbol::Funcdef)]
        );
        let decorators = tree.children(decorated)[0];
        for decorator in tree.children(decorators) {
            assert!(tree.is_symbol(*decorator, Symbol::Decorator));
            let last = tree.last_leaf(*decorator).unwrap();
            assert!(tree.is_token(last, TokenKind::Newline));
        }

        let single = parse("@a\nclass C:\n    pass\n");
        let decorated = tree_first(&single);
        assert_eq!(
            symbols(&single, decorated),
            vec![Some(Symbol::Decorator), Some(Symbol::Classdef)]
        );
    }

    fn tree_first(tree: &Tree) -> NodeId {
        tree.children(tree.root())[0]
    }

    #[test]
    fn test_async_statements() {
        let tree = parse("async def f():\n    pass\n");
        let async_stmt = tree_first(&tree);
        assert!(tree.is_symbol(async_stmt, Symbol::AsyncStmt));
        let parts = tree.children(async_stmt).to_vec();
        assert!(tree.is_token(parts[0], TokenKind::Async));
        assert!(tree.is_symbol(parts[1], Symbol::Funcdef));

        let tree = parse("@d\nasync def f():\n    pass\n");
        let decorated = tree_first(&tree);
        assert_eq!(
            symbols(&tree, decorated),
            vec![Some(Symbol::Decorator), Some(Symbol::AsyncFuncdef)]
        );
    }

    #[test]
    fn test_match_statement_shape() {
        let tree = parse("match p:\n    case 1:\n        pass\n    case _:\n        pass\n");
        let match_stmt = tree_first(&tree);
        assert!(tree.is_symbol(match_stmt, Symbol::MatchStmt));
        let parts = tree.children(match_stmt).to_vec();
        let newline = parts
            .iter()
            .position(|part| tree.is_token(*part, TokenKind::Newline))
            .unwrap();
        assert_eq!(newline, 3);
        assert!(tree.is_token(parts[4], TokenKind::Indent));
        assert!(tree.is_symbol(parts[5], Symbol::CaseBlock));
        assert!(tree.is_symbol(parts[6], Symbol::CaseBlock));
        assert!(tree.is_token(parts[7], TokenKind::Dedent));
        assert_eq!(tree.leaf(parts[7]).unwrap().line, 5);
    }

    #[test]
    fn test_string_is_one_leaf() {
        let tree = parse("s = f'{a}' '''x\ny'''\n");
        let strings: Vec<_> = tree
            .leaves(tree.root())
            .into_iter()
            .filter(|leaf| tree.is_token(*leaf, TokenKind::String))
            .collect();
        assert_eq!(strings.len(), 2);
        let last = tree.leaf(strings[1]).unwrap();
        assert_eq!(last.value, "'''x\ny'''");
        assert_eq!(last.end_line(), 2);
    }

    #[test]
    fn test_syntax_error() {
        let mut parser = CstParser::new().unwrap();
        let err = parser.parse("x = 1\ndef f(:\n").unwrap_err();
        assert!(matches!(err, CstError::Syntax { .. }));
    }
}
