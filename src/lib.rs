//! Static declaration-order checker for SQL schema scripts.
//!
//! A schema script is valid to apply top to bottom only if every table it
//! references through `REFERENCES` is created earlier in the same script.
//! This crate finds the table declarations and their foreign-key references
//! without a full SQL parser, then reports references to tables that are
//! declared later, never declared, or declared more than once.
//!
//! # Example
//!
//! ```
//! use schema_lint::{ViolationKind, extract, validate};
//!
//! let schema = "
//!     CREATE TABLE employees (id INT, role_id INT REFERENCES roles(id));
//!     CREATE TABLE roles (id INT PRIMARY KEY);
//! ";
//! let declarations = extract(schema);
//! assert_eq!(declarations.len(), 2);
//! assert!(declarations["employees"].depends_on("roles"));
//!
//! let violations = validate(&declarations);
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].kind(), ViolationKind::ForwardReference);
//! ```
//!
//! [`check`] runs the same core together with the statement inventory,
//! structural lints and an optional expectations manifest.

pub mod check;
pub mod diag;
pub mod error;
pub mod expect;
pub mod extract;
pub mod inventory;
pub mod lexer;
pub mod lint;
pub mod model;
pub mod presence;
pub mod report;
pub mod scan;
pub mod span;
pub mod validate;

pub use check::{CheckConfig, CheckOutcome, check};
pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, SourceFile};
pub use error::LoadError;
pub use expect::{ExpectationReport, Expectations, Verdict};
pub use extract::{ExtractConfig, extract, extract_with};
pub use inventory::Inventory;
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use model::{Declaration, DeclarationMap, Occurrence, Violation, ViolationKind};
pub use span::{Span, Spanned};
pub use validate::validate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _spanned = Spanned::new("roles", 0..5);
        let map: DeclarationMap = extract("");
        assert!(validate(&map).is_empty());
    }
}
