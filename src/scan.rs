//! Token cursor shared by the extractor and the inventory scanner.

use crate::lexer::token::{Token, TokenKind};
use crate::span::{Span, Spanned};
use smol_str::SmolStr;

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: 0..0,
};

/// Cursor over a token slice with lookahead and keyword matching.
///
/// Navigation never panics: reading past the end yields the final token,
/// which the lexer guarantees is [`TokenKind::Eof`].
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Returns the current token.
    pub fn current(&self) -> &'a Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    /// Returns the kind of the token `n` positions ahead of the current one.
    pub fn peek_kind(&self, n: usize) -> &'a TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|token| &token.kind)
            .unwrap_or(&EOF.kind)
    }

    /// Advances to the next token. Does nothing at EOF.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Consumes the current token if it matches `kind`.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `kinds` in order if all of them match, otherwise consumes nothing.
    pub fn consume_sequence(&mut self, kinds: &[TokenKind]) -> bool {
        let matches = kinds
            .iter()
            .enumerate()
            .all(|(i, kind)| self.peek_kind(i) == kind);
        if matches {
            for _ in kinds {
                self.advance();
            }
        }
        matches
    }

    pub fn at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Reads a possibly schema-qualified name such as `public.roles`.
    ///
    /// Each part is normalized via [`TokenKind::as_name`]; the span covers
    /// the whole dotted path. Returns `None` without consuming anything if
    /// the current token cannot start a name.
    pub fn qualified_name(&mut self) -> Option<Spanned<SmolStr>> {
        let first = self.current();
        let mut name = first.kind.as_name()?.to_string();
        let start = first.span.start;
        let mut end = first.span.end;
        self.advance();

        while self.check(&TokenKind::Dot) {
            let Some(part) = self.peek_kind(1).as_name() else {
                break;
            };
            self.advance();
            end = self.current().span.end;
            self.advance();
            name.push('.');
            name.push_str(&part);
        }

        Some(Spanned::new(SmolStr::new(name), start..end))
    }

    /// Reads a parenthesized, comma separated list of simple names.
    ///
    /// Returns an empty list if the current token is not `(`. An unclosed
    /// list stops at the end of the statement.
    pub fn name_list(&mut self) -> Vec<SmolStr> {
        let mut names = Vec::new();
        if !self.consume(&TokenKind::LParen) {
            return names;
        }
        while !self.at_end()
            && !self.check(&TokenKind::RParen)
            && !self.check(&TokenKind::Semicolon)
        {
            if let Some(name) = self.current().kind.as_name() {
                names.push(name);
            }
            self.advance();
        }
        self.consume(&TokenKind::RParen);
        names
    }

    /// Advances past the end of the current statement (the next `;`).
    pub fn skip_statement(&mut self) {
        while !self.at_end() {
            let done = self.check(&TokenKind::Semicolon);
            self.advance();
            if done {
                break;
            }
        }
    }

    /// Returns the span of the previous token, or of the current one at the start.
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.clone(),
            None => self.current().span.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn qualified_name_joins_parts() {
        let source = r#"public."Roles" ("#;
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens);
        let name = stream.qualified_name().map(Spanned::into_inner);
        assert_eq!(name.as_deref(), Some("public.Roles"));
        assert!(stream.check(&TokenKind::LParen));
    }

    #[test]
    fn qualified_name_span_covers_path() {
        let source = "app.orders(id)";
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens);
        let name = stream.qualified_name();
        assert_eq!(name.map(|n| n.span), Some(0..10));
    }

    #[test]
    fn consume_sequence_is_all_or_nothing() {
        let tokens = tokenize("IF NOT foo").tokens;
        let mut stream = TokenStream::new(&tokens);
        assert!(!stream.consume_sequence(&[TokenKind::If, TokenKind::Not, TokenKind::Exists]));
        assert!(stream.check(&TokenKind::If));
        assert!(stream.consume_sequence(&[TokenKind::If, TokenKind::Not]));
        assert_eq!(stream.current().kind, TokenKind::Identifier("foo".into()));
    }

    #[test]
    fn name_list_reads_columns() {
        let tokens = tokenize("(role_id, \"Permission_Id\") REFERENCES").tokens;
        let mut stream = TokenStream::new(&tokens);
        let names = stream.name_list();
        assert_eq!(names, vec![SmolStr::new("role_id"), SmolStr::new("Permission_Id")]);
        assert!(stream.check(&TokenKind::References));
    }

    #[test]
    fn skip_statement_stops_after_semicolon() {
        let tokens = tokenize("INSERT INTO roles VALUES (1); CREATE").tokens;
        let mut stream = TokenStream::new(&tokens);
        stream.skip_statement();
        assert!(stream.check(&TokenKind::Create));
        stream.skip_statement();
        assert!(stream.at_end());
        stream.advance();
        assert!(stream.at_end());
    }
}
