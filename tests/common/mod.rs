//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration tests.
//!
//! # Fixtures
//! - [`POS_SCHEMA`] - a point-of-sale permission schema in dependency order
//! - [`PERMISSIONS_MANIFEST`] - expectations matching [`POS_SCHEMA`]
//!
//! # Helpers
//! - [`violations_of`] - extract and validate in one call
//! - [`summarize`] - violations as `(kind, subject, target)` triples
//! - [`assert_no_violations`] - fail with the rendered violations
//! - [`table_schema`] - build a document from `(table, references)` pairs

#![allow(dead_code)]

use schema_lint::{Violation, ViolationKind, extract, validate};

pub const POS_SCHEMA: &str = include_str!("../fixtures/pos_schema.sql");
pub const PERMISSIONS_MANIFEST: &str = include_str!("../fixtures/permissions_manifest.json");

/// Runs the ordering core over `document`.
pub fn violations_of(document: &str) -> Vec<Violation> {
    validate(&extract(document))
}

/// Format violations for display in assertion messages.
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reduces violations to `(kind, subject, target)` for compact assertions.
pub fn summarize(violations: &[Violation]) -> Vec<(ViolationKind, String, Option<String>)> {
    violations
        .iter()
        .map(|v| {
            (
                v.kind(),
                v.subject().to_string(),
                v.target().map(str::to_string),
            )
        })
        .collect()
}

/// Assert that `document` passes the ordering core.
///
/// # Panics
/// Panics if any violation is reported, listing all of them.
pub fn assert_no_violations(document: &str) {
    let violations = violations_of(document);
    assert!(
        violations.is_empty(),
        "expected no violations, found {}:\n{}",
        violations.len(),
        format_violations(&violations)
    );
}

/// Builds a schema with one `CREATE TABLE` per entry, in order.
///
/// Each table gets an `id` column and one inline reference column per target.
///
/// # Example
/// ```no_run
/// let doc = table_schema(&[("roles", &[]), ("employees", &["roles"])]);
/// assert_no_violations(&doc);
/// ```
pub fn table_schema(tables: &[(&str, &[&str])]) -> String {
    tables
        .iter()
        .map(|(name, targets)| {
            let mut columns = vec!["    id SERIAL PRIMARY KEY".to_string()];
            columns.extend(
                targets
                    .iter()
                    .map(|t| format!("    {t}_id INTEGER REFERENCES {t}(id)")),
            );
            format!("CREATE TABLE {name} (\n{}\n);\n", columns.join(",\n"))
        })
        .collect()
}
