//! Lexical analysis for SQL schema scripts.
//!
//! The lexer is error tolerant: it never stops on malformed input. Problems
//! such as an unterminated string are recorded as warnings and the scan
//! continues, so the extractor always sees a complete token stream. Comments,
//! string literals and dollar-quoted bodies are folded into single tokens (or
//! skipped), which keeps keywords that appear inside them from being mistaken
//! for statement markers.

pub mod keywords;
pub mod token;

use crate::diag::Diag;
use crate::span::Span;
use smol_str::SmolStr;
use token::{Token, TokenKind};

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Warnings encountered during lexing.
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer for SQL source text.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text, consuming the lexer.
    pub fn tokenize(mut self) -> LexerResult {
        while !self.is_at_end() {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }

        let eof_pos = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_token(&mut self) {
        let start = self.pos;
        let ch = self.advance();

        match ch {
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            ',' => self.add_token(TokenKind::Comma, start),
            ';' => self.add_token(TokenKind::Semicolon, start),
            '.' => self.add_token(TokenKind::Dot, start),
            '\'' => self.scan_string_literal(start, false),
            '"' => self.scan_quoted_identifier(start),
            '$' => self.scan_dollar(start),
            '0'..='9' => self.scan_number(start),
            c if Self::is_identifier_start(c) => self.scan_identifier_or_keyword(start),
            other => self.add_token(TokenKind::Symbol(other), start),
        }
    }

    fn scan_identifier_or_keyword(&mut self, start: usize) {
        while Self::is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text = &self.source[start..self.pos];

        // E'...' is a string constant with C-style escapes.
        if matches!(text, "E" | "e") && self.peek() == '\'' {
            self.advance();
            self.scan_string_literal(start, true);
            return;
        }

        match keywords::lookup_keyword(text) {
            Some(kind) => self.add_token(kind, start),
            None => self.add_token(TokenKind::Identifier(SmolStr::new(text)), start),
        }
    }

    /// Scans a single-quoted string. The opening quote is already consumed.
    fn scan_string_literal(&mut self, start: usize, backslash_escapes: bool) {
        let mut value = String::new();
        let mut closed = false;

        while !self.is_at_end() {
            let ch = self.advance();
            match ch {
                '\'' if self.peek() == '\'' => {
                    self.advance();
                    value.push('\'');
                }
                '\'' => {
                    closed = true;
                    break;
                }
                '\\' if backslash_escapes && !self.is_at_end() => {
                    let escaped = self.advance();
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        other => value.push(other),
                    }
                }
                other => value.push(other),
            }
        }

        if !closed {
            self.warning(start, "unclosed string literal", "L001");
        }
        self.add_token(TokenKind::StringLiteral(SmolStr::new(value)), start);
    }

    /// Scans a double-quoted identifier. The opening quote is already consumed.
    fn scan_quoted_identifier(&mut self, start: usize) {
        let mut value = String::new();
        let mut closed = false;

        while !self.is_at_end() {
            let ch = self.advance();
            if ch == '"' {
                if self.peek() == '"' {
                    self.advance();
                    value.push('"');
                } else {
                    closed = true;
                    break;
                }
            } else {
                value.push(ch);
            }
        }

        if !closed {
            self.warning(start, "unclosed quoted identifier", "L002");
        }
        self.add_token(TokenKind::QuotedIdentifier(SmolStr::new(value)), start);
    }

    /// Scans `$1` parameters and `$tag$ ... $tag$` bodies. The `$` is consumed.
    fn scan_dollar(&mut self, start: usize) {
        if self.peek().is_ascii_digit() {
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            let text = &self.source[start + 1..self.pos];
            self.add_token(TokenKind::Parameter(SmolStr::new(text)), start);
            return;
        }

        let tag_start = self.pos;
        if Self::is_identifier_start(self.peek()) {
            while self.peek() != '$' && Self::is_identifier_continue(self.peek()) {
                self.advance();
            }
        }
        if self.peek() != '$' {
            // Not a dollar quote after all.
            self.pos = tag_start;
            self.add_token(TokenKind::Symbol('$'), start);
            return;
        }
        self.advance();

        let delimiter = &self.source[start..self.pos];
        let body_start = self.pos;
        match self.source[body_start..].find(delimiter) {
            Some(offset) => {
                let body = &self.source[body_start..body_start + offset];
                self.pos = body_start + offset + delimiter.len();
                self.add_token(TokenKind::DollarQuoted(SmolStr::new(body)), start);
            }
            None => {
                let body = &self.source[body_start..];
                self.pos = self.source.len();
                self.warning(start, &format!("unclosed {} block", delimiter), "L004");
                self.add_token(TokenKind::DollarQuoted(SmolStr::new(body)), start);
            }
        }
    }

    fn scan_number(&mut self, start: usize) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        if matches!(self.peek(), 'e' | 'E')
            && (self.peek_next().is_ascii_digit() || matches!(self.peek_next(), '+' | '-'))
        {
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        self.add_token(TokenKind::Number(SmolStr::new(text)), start);
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '-' if self.peek_next() == '-' => {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == '*' => {
                    let comment_start = self.pos;
                    self.advance();
                    self.advance();

                    // PostgreSQL block comments nest.
                    let mut depth = 1;
                    while depth > 0 && !self.is_at_end() {
                        if self.peek() == '/' && self.peek_next() == '*' {
                            self.advance();
                            self.advance();
                            depth += 1;
                        } else if self.peek() == '*' && self.peek_next() == '/' {
                            self.advance();
                            self.advance();
                            depth -= 1;
                        } else {
                            self.advance();
                        }
                    }

                    if depth > 0 {
                        self.warning(comment_start, "unclosed block comment", "L003");
                    }
                }
                _ => break,
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_identifier_continue(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, start..self.pos));
    }

    fn warning(&mut self, pos: usize, message: &str, code: &str) {
        let width = self.source[pos..].chars().next().map_or(0, char::len_utf8);
        let span: Span = pos..pos + width;
        self.diagnostics.push(
            Diag::warning(message)
                .with_primary_label(span, "starts here")
                .with_code(code),
        );
    }

    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    /// Steps past the current character. Returns `'\0'` only at the end;
    /// a NUL inside the source is consumed like any other character.
    fn advance(&mut self) -> char {
        match self.source[self.pos..].chars().next() {
            Some(ch) => {
                self.pos += ch.len_utf8();
                ch
            }
            None => '\0',
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Convenience function to tokenize a source string.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
