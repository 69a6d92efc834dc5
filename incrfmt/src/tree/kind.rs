//! Token and grammar-symbol tags carried by tree nodes.

use std::fmt;

/// Kind of a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifiers and name-like literals (`True`, `None`, ...).
    Name,
    /// Integer, float and imaginary literals.
    Number,
    /// A complete string literal, including prefix and quotes.
    String,
    /// Punctuation and operators.
    Op,
    /// Keywords other than `async`.
    Keyword,
    /// The `async` keyword. Kept separate because the grammar hangs it one
    /// level above the statement it modifies.
    Async,
    /// End of a logical line.
    Newline,
    /// Start of an indented block. Zero width.
    Indent,
    /// End of an indented block. Zero width.
    Dedent,
    /// End of file. Its prefix holds any trailing trivia.
    EndMarker,
    /// Pass-through text that the renderer must emit unchanged, followed by
    /// exactly one line terminator.
    Verbatim,
}

/// Grammar symbol of an interior node.
///
/// Only the statement shapes the collapser cares about get their own
/// variant; everything else is carried as [`Symbol::Other`] with the
/// producing grammar's node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Root of a module.
    FileInput,
    /// One or more `;`-separated small statements plus their NEWLINE.
    SimpleStmt,
    /// `NEWLINE INDENT stmt+ DEDENT`.
    Suite,
    /// `match subject: NEWLINE INDENT case_block+ DEDENT`.
    MatchStmt,
    /// `case pattern [guard]: suite`.
    CaseBlock,
    /// `@expr NEWLINE`.
    Decorator,
    /// Two or more consecutive decorators.
    Decorators,
    /// Decorator(s) followed by a class or function definition.
    Decorated,
    /// `async` followed by a `def`, `for` or `with` statement.
    AsyncStmt,
    /// `async def` below a decorated definition.
    AsyncFuncdef,
    /// `def` statement.
    Funcdef,
    /// `class` statement.
    Classdef,
    /// `if` statement including its `elif`/`else` clauses.
    IfStmt,
    /// `for` statement.
    ForStmt,
    /// `while` statement.
    WhileStmt,
    /// `try` statement including its handlers.
    TryStmt,
    /// `with` statement.
    WithStmt,
    /// Any other grammar node (expressions, parameters, ...).
    Other(&'static str),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FileInput => "file_input",
            Self::SimpleStmt => "simple_stmt",
            Self::Suite => "suite",
            Self::MatchStmt => "match_stmt",
            Self::CaseBlock => "case_block",
            Self::Decorator => "decorator",
            Self::Decorators => "decorators",
            Self::Decorated => "decorated",
            Self::AsyncStmt => "async_stmt",
            Self::AsyncFuncdef => "async_funcdef",
            Self::Funcdef => "funcdef",
            Self::Classdef => "classdef",
            Self::IfStmt => "if_stmt",
            Self::ForStmt => "for_stmt",
            Self::WhileStmt => "while_stmt",
            Self::TryStmt => "try_stmt",
            Self::WithStmt => "with_stmt",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}
