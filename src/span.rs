//! Source locations: byte spans and spanned values.

use std::ops::Range;

/// A byte range in the schema document.
pub type Span = Range<usize>;

/// A value paired with the span of source text it was read from.
///
/// The extractor and inventory use `Spanned<SmolStr>` for entity names so
/// that reports can point back at the exact identifier in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    /// The wrapped value.
    pub node: T,
    /// Where the value appears in the document.
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Creates a new spanned value.
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Extracts the inner value, discarding the span.
    pub fn into_inner(self) -> T {
        self.node
    }
}

/// Returns the 1-based line number containing byte offset `pos`.
pub fn line_of(source: &str, pos: usize) -> usize {
    let end = pos.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
