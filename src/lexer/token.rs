//! Token types produced by the SQL lexer.

use crate::span::Span;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token.
///
/// Only the keywords that introduce or shape the statements we inspect get
/// their own variant; every other word is an [`TokenKind::Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Statement keywords
    Create,
    Alter,
    Insert,
    Into,
    Add,

    // Object keywords
    Table,
    Type,
    Function,
    Procedure,
    Index,
    View,
    Materialized,
    Trigger,

    // Modifiers
    Or,
    Replace,
    If,
    Not,
    Exists,
    Global,
    Local,
    Temp,
    Temporary,
    Unlogged,
    Unique,
    Concurrently,
    Only,

    // Constraint keywords
    Constraint,
    Foreign,
    Key,
    References,

    /// An unquoted word, kept exactly as written.
    Identifier(SmolStr),
    /// A `"double quoted"` identifier with escapes resolved.
    QuotedIdentifier(SmolStr),
    /// A `'string'` or `E'string'` literal with escapes resolved.
    StringLiteral(SmolStr),
    /// The body of a `$tag$ ... $tag$` block.
    DollarQuoted(SmolStr),
    /// A numeric literal.
    Number(SmolStr),
    /// A positional parameter such as `$1`.
    Parameter(SmolStr),

    // Punctuation
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    /// Any other operator or symbol character.
    Symbol(char),

    Eof,
}

impl TokenKind {
    /// Returns true if this is the unquoted word `word`, ignoring ASCII case.
    ///
    /// For SQL words that have no keyword variant, such as `on` or `grant`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, TokenKind::Identifier(text) if text.eq_ignore_ascii_case(word))
    }

    /// Returns the normalized entity name this token spells, if it can name one.
    ///
    /// Unquoted words fold to lower case the way PostgreSQL folds them, quoted
    /// identifiers keep their exact text. Keywords that are not structural in
    /// the positions we read (`key`, `type`, `index`, ...) are accepted as names
    /// too, since they are common column and table names.
    pub fn as_name(&self) -> Option<SmolStr> {
        match self {
            TokenKind::Identifier(text) => Some(SmolStr::new(text.to_lowercase())),
            TokenKind::QuotedIdentifier(text) => Some(text.clone()),
            TokenKind::Key
            | TokenKind::Type
            | TokenKind::Index
            | TokenKind::View
            | TokenKind::Trigger
            | TokenKind::Function
            | TokenKind::Procedure
            | TokenKind::Local
            | TokenKind::Global
            | TokenKind::Temp
            | TokenKind::Add
            | TokenKind::Replace => Some(SmolStr::new(self.to_string().to_lowercase())),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Create => write!(f, "CREATE"),
            TokenKind::Alter => write!(f, "ALTER"),
            TokenKind::Insert => write!(f, "INSERT"),
            TokenKind::Into => write!(f, "INTO"),
            TokenKind::Add => write!(f, "ADD"),
            TokenKind::Table => write!(f, "TABLE"),
            TokenKind::Type => write!(f, "TYPE"),
            TokenKind::Function => write!(f, "FUNCTION"),
            TokenKind::Procedure => write!(f, "PROCEDURE"),
            TokenKind::Index => write!(f, "INDEX"),
            TokenKind::View => write!(f, "VIEW"),
            TokenKind::Materialized => write!(f, "MATERIALIZED"),
            TokenKind::Trigger => write!(f, "TRIGGER"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::Replace => write!(f, "REPLACE"),
            TokenKind::If => write!(f, "IF"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::Exists => write!(f, "EXISTS"),
            TokenKind::Global => write!(f, "GLOBAL"),
            TokenKind::Local => write!(f, "LOCAL"),
            TokenKind::Temp => write!(f, "TEMP"),
            TokenKind::Temporary => write!(f, "TEMPORARY"),
            TokenKind::Unlogged => write!(f, "UNLOGGED"),
            TokenKind::Unique => write!(f, "UNIQUE"),
            TokenKind::Concurrently => write!(f, "CONCURRENTLY"),
            TokenKind::Only => write!(f, "ONLY"),
            TokenKind::Constraint => write!(f, "CONSTRAINT"),
            TokenKind::Foreign => write!(f, "FOREIGN"),
            TokenKind::Key => write!(f, "KEY"),
            TokenKind::References => write!(f, "REFERENCES"),
            TokenKind::Identifier(text) => write!(f, "{}", text),
            TokenKind::QuotedIdentifier(text) => write!(f, "\"{}\"", text),
            TokenKind::StringLiteral(text) => write!(f, "'{}'", text),
            TokenKind::DollarQuoted(_) => write!(f, "$$...$$"),
            TokenKind::Number(text) => write!(f, "{}", text),
            TokenKind::Parameter(text) => write!(f, "${}", text),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Symbol(ch) => write!(f, "{}", ch),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its location in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
