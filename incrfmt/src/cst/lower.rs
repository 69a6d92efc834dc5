//! Lowering of a tree-sitter parse into the statement-shaped [`Tree`].
//!
//! tree-sitter hides NEWLINE, INDENT and DEDENT tokens and keeps comments as
//! loose extra nodes. The collapser needs the opposite: every logical line
//! ends with a NEWLINE leaf, bodies are `suite` nodes, and trivia sits in the
//! prefix of the following leaf. Leaves are cut from the source with a
//! single forward cursor, so the lowered tree always renders back to the
//! exact input.

use tree_sitter::Node;

use crate::tree::{Symbol, TokenKind, Tree, TreeBuilder};
use crate::utils::{line_terminator_len, LineIndex};

/// Clauses whose tokens belong to the statement that owns them.
const CLAUSES: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
];

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    (0..node.child_count())
        .filter_map(|i| node.child(i as u32))
        .filter(|child| !child.is_extra())
        .collect()
}

/// Symbol of a compound statement, `None` for simple statements.
fn compound_symbol(kind: &str) -> Option<Symbol> {
    Some(match kind {
        "if_statement" => Symbol::IfStmt,
        "for_statement" => Symbol::ForStmt,
        "while_statement" => Symbol::WhileStmt,
        "try_statement" => Symbol::TryStmt,
        "with_statement" => Symbol::WithStmt,
        "function_definition" => Symbol::Funcdef,
        "class_definition" => Symbol::Classdef,
        "decorated_definition" => Symbol::Decorated,
        "match_statement" => Symbol::MatchStmt,
        _ => return None,
    })
}

fn leaf_kind(node: Node<'_>, text: &str) -> TokenKind {
    match node.kind() {
        "string" => TokenKind::String,
        "integer" | "float" => TokenKind::Number,
        kind if kind.contains("identifier") => TokenKind::Name,
        _ if text.starts_with(|c: char| c.is_ascii_digit()) => TokenKind::Number,
        _ if !text.is_empty() && text.chars().all(|c| c.is_alphabetic() || c == '_') => {
            TokenKind::Keyword
        }
        _ => TokenKind::Op,
    }
}

pub(super) struct Lowering<'s> {
    source: &'s str,
    index: LineIndex,
    builder: TreeBuilder,
    cursor: usize,
    /// Line on which the last emitted leaf ends.
    last_line: usize,
}

impl<'s> Lowering<'s> {
    pub(super) fn new(source: &'s str) -> Self {
        Self {
            source,
            index: LineIndex::new(source),
            builder: TreeBuilder::new(Symbol::FileInput),
            cursor: 0,
            last_line: 1,
        }
    }

    pub(super) fn lower(mut self, module: Node<'_>) -> Tree {
        self.statements(&children(module));
        let end = self.source.len();
        self.take(TokenKind::EndMarker, end, end);
        self.builder.finish()
    }

    /// Emit `source[start..end]` as a leaf; the bytes skipped since the last
    /// leaf become its prefix. A range behind the cursor is clamped to it.
    fn take(&mut self, kind: TokenKind, start: usize, end: usize) {
        let len = self.source.len();
        let start = start.clamp(self.cursor, len);
        let end = end.clamp(start, len);
        let prefix = self.source.get(self.cursor..start).unwrap_or_default();
        let value = self.source.get(start..end).unwrap_or_default();
        let line = self.index.line_of(start);
        self.builder.token(kind, prefix, value, line);
        self.cursor = end;
        self.last_line = if kind == TokenKind::Newline {
            line
        } else {
            line + value.bytes().filter(|b| *b == b'\n').count()
        };
    }

    /// Zero-width INDENT or DEDENT; consumes nothing.
    fn marker(&mut self, kind: TokenKind, line: usize) {
        self.builder.token(kind, "", "", line);
    }

    /// NEWLINE closing the current logical line: the next line break, or an
    /// empty token at end of file. Trailing blanks and comments become its
    /// prefix.
    fn newline(&mut self) {
        let rest = self.source.get(self.cursor..).unwrap_or_default();
        match rest.find('\n') {
            Some(offset) => {
                let mut start = self.cursor + offset;
                if offset > 0 && line_terminator_len(self.source, start - 1) == 2 {
                    start -= 1;
                }
                self.take(TokenKind::Newline, start, self.cursor + offset + 1);
            }
            None => {
                let end = self.source.len();
                self.take(TokenKind::Newline, end, end);
            }
        }
    }

    /// Whether `node` starts before the end of the line the cursor is on.
    fn on_current_line(&self, node: Node<'_>) -> bool {
        let rest = self.source.get(self.cursor..).unwrap_or_default();
        rest.find('\n')
            .map_or(true, |offset| node.start_byte() < self.cursor + offset)
    }

    fn statements(&mut self, nodes: &[Node<'_>]) {
        let mut i = 0;
        while i < nodes.len() {
            match compound_symbol(nodes[i].kind()) {
                Some(symbol) => {
                    self.compound(nodes[i], symbol, Symbol::AsyncStmt);
                    i += 1;
                }
                None => i = self.simple_statements(nodes, i),
            }
        }
    }

    /// `stmt (';' stmt)* [';'] NEWLINE`. Returns the index of the first node
    /// after the group.
    fn simple_statements(&mut self, nodes: &[Node<'_>], start: usize) -> usize {
        self.builder.start_node(Symbol::SimpleStmt);
        let mut i = start;
        loop {
            self.expression(nodes[i]);
            i += 1;
            let Some(next) = nodes.get(i) else { break };
            if next.kind() != ";" {
                break;
            }
            self.expression(*next);
            i += 1;
            match nodes.get(i) {
                Some(next)
                    if compound_symbol(next.kind()).is_none()
                        && next.kind() != ";"
                        && self.on_current_line(*next) => {}
                _ => break,
            }
        }
        self.newline();
        self.builder.finish_node();
        i
    }

    fn compound(&mut self, node: Node<'_>, symbol: Symbol, async_wrapper: Symbol) {
        match symbol {
            Symbol::Decorated => self.decorated(node),
            Symbol::MatchStmt => self.match_statement(node),
            _ => self.block_statement(node, symbol, async_wrapper),
        }
    }

    /// `[ASYNC] keyword ... ':' body (clause ':' body)*`. A leading `async`
    /// is hoisted into a wrapper node around the statement.
    fn block_statement(&mut self, node: Node<'_>, symbol: Symbol, async_wrapper: Symbol) {
        let parts = children(node);
        let (head, rest) = match parts.split_first() {
            Some((first, rest)) if first.kind() == "async" => (Some(*first), rest),
            _ => (None, parts.as_slice()),
        };
        if let Some(keyword) = head {
            self.builder.start_node(async_wrapper);
            self.take(TokenKind::Async, keyword.start_byte(), keyword.end_byte());
        }
        self.builder.start_node(symbol);
        self.clauses(rest);
        self.builder.finish_node();
        if head.is_some() {
            self.builder.finish_node();
        }
    }

    fn clauses(&mut self, nodes: &[Node<'_>]) {
        for node in nodes {
            match node.kind() {
                kind if CLAUSES.contains(&kind) => self.clauses(&children(*node)),
                "block" => self.block(*node),
                _ => self.expression(*node),
            }
        }
    }

    /// A body on the header line is inlined; an indented one becomes
    /// `suite: NEWLINE INDENT stmt+ DEDENT`.
    fn block(&mut self, node: Node<'_>) {
        let statements = children(node);
        let Some(first) = statements.first() else {
            return;
        };
        let header_line = self.index.line_of(self.cursor.saturating_sub(1));
        if self.index.line_of(first.start_byte()) == header_line {
            self.statements(&statements);
            return;
        }
        self.builder.start_node(Symbol::Suite);
        self.newline();
        self.marker(TokenKind::Indent, self.index.line_of(first.start_byte()));
        self.statements(&statements);
        self.marker(TokenKind::Dedent, self.last_line);
        self.builder.finish_node();
    }

    fn decorated(&mut self, node: Node<'_>) {
        let (decorators, definitions): (Vec<Node<'_>>, Vec<Node<'_>>) = children(node)
            .into_iter()
            .partition(|child| child.kind() == "decorator");

        self.builder.start_node(Symbol::Decorated);
        let wrap = decorators.len() > 1;
        if wrap {
            self.builder.start_node(Symbol::Decorators);
        }
        for decorator in decorators {
            self.builder.start_node(Symbol::Decorator);
            for part in children(decorator) {
                self.expression(part);
            }
            self.newline();
            self.builder.finish_node();
        }
        if wrap {
            self.builder.finish_node();
        }
        for definition in definitions {
            match compound_symbol(definition.kind()) {
                Some(symbol) => self.compound(definition, symbol, Symbol::AsyncFuncdef),
                None => self.expression(definition),
            }
        }
        self.builder.finish_node();
    }

    /// `match_stmt: 'match' subject ':' NEWLINE INDENT case_block+ DEDENT`,
    /// with no suite node in between.
    fn match_statement(&mut self, node: Node<'_>) {
        self.builder.start_node(Symbol::MatchStmt);
        for part in children(node) {
            if part.kind() != "block" {
                self.expression(part);
                continue;
            }
            let cases = children(part);
            self.newline();
            let first_line = cases
                .first()
                .map_or(self.last_line, |case| self.index.line_of(case.start_byte()));
            self.marker(TokenKind::Indent, first_line);
            for case in cases {
                if case.kind() == "case_clause" {
                    self.builder.start_node(Symbol::CaseBlock);
                    self.clauses(&children(case));
                    self.builder.finish_node();
                } else {
                    self.expression(case);
                }
            }
            self.marker(TokenKind::Dedent, self.last_line);
        }
        self.builder.finish_node();
    }

    /// Anything below statement level. String literals stay one leaf.
    fn expression(&mut self, node: Node<'_>) {
        if node.child_count() == 0 || node.kind() == "string" {
            let text = self
                .source
                .get(node.start_byte()..node.end_byte())
                .unwrap_or_default();
            let kind = leaf_kind(node, text);
            self.take(kind, node.start_byte(), node.end_byte());
            return;
        }
        self.builder.start_node(Symbol::Other(node.kind()));
        for child in children(node) {
            self.expression(child);
        }
        self.builder.finish_node();
    }
}
