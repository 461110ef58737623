//! Human and machine readable renderings of a [`CheckOutcome`].

use crate::check::CheckOutcome;
use crate::diag::{Diag, SourceFile, to_reports};
use crate::error::LoadError;
use crate::expect::Verdict;
use crate::model::{DeclarationMap, Violation};
use crate::span::line_of;
use miette::{GraphicalReportHandler, GraphicalTheme};
use std::fmt;

/// Converts an ordering violation into a diagnostic labeled against the schema.
pub fn violation_diag(violation: &Violation, declarations: &DeclarationMap) -> Diag {
    let diag = Diag::error(violation.to_string()).with_code(violation.kind().code());
    match violation {
        Violation::UndeclaredReference {
            subject,
            target,
            span,
            ..
        } => diag
            .with_primary_label(span.clone(), format!("'{target}' is never declared"))
            .with_help(format!(
                "declare table '{target}' before '{subject}', or fix the referenced name"
            )),
        Violation::ForwardReference {
            subject,
            target,
            span,
            ..
        } => {
            let diag = diag.with_primary_label(span.clone(), format!("'{target}' referenced here"));
            let diag = match declarations.get(target) {
                Some(decl) => diag.with_secondary_label(
                    decl.span.clone(),
                    format!("'{target}' is declared here, after '{subject}'"),
                ),
                None => diag,
            };
            diag.with_help(format!("move the declaration of '{target}' above '{subject}'"))
        }
        Violation::DuplicateDeclaration { name, spans, .. } => {
            let mut diag = diag.with_help(format!("remove the repeated declarations of '{name}'"));
            for (i, span) in spans.iter().enumerate() {
                diag = if i == 0 {
                    diag.with_secondary_label(span.clone(), "first declared here")
                } else {
                    diag.with_primary_label(span.clone(), "declared again here")
                };
            }
            diag
        }
    }
}

/// Plain text report: declared tables, diagnostics, components and a verdict.
pub struct TextReport<'a> {
    outcome: &'a CheckOutcome,
    source: &'a SourceFile,
    handler: GraphicalReportHandler,
}

impl<'a> TextReport<'a> {
    pub fn new(outcome: &'a CheckOutcome, source: &'a SourceFile) -> Self {
        Self {
            outcome,
            source,
            handler: GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()),
        }
    }

    /// Renders diagnostics with ANSI colors.
    pub fn colored(mut self) -> Self {
        self.handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode());
        self
    }

    fn tables(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declarations = &self.outcome.declarations;
        writeln!(f, "Found {} table(s) in declaration order:", declarations.len())?;
        let width = declarations.keys().map(|k| k.len()).max().unwrap_or(0);
        for (index, decl) in declarations.values().enumerate() {
            let deps = if decl.dependencies.is_empty() {
                "none".to_string()
            } else {
                decl.dependencies
                    .keys()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let line = line_of(self.source.content(), decl.span.start);
            writeln!(
                f,
                "  {:>3}. {:<width$}  line {line:<5} -> depends on: {deps}",
                index + 1,
                decl.name
            )?;
        }
        Ok(())
    }

    fn expectations(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(report) = &self.outcome.expectations else {
            return Ok(());
        };
        let verdict = match report.verdict() {
            Verdict::Complete => "complete",
            Verdict::MostlyComplete => "mostly complete",
            Verdict::Incomplete => "incomplete",
        };
        writeln!(
            f,
            "\nExpectations: {}/{} satisfied ({:.1}%), {verdict}",
            report.passed(),
            report.total(),
            report.success_rate()
        )?;
        for missing in report.missing() {
            writeln!(f, "  missing: {missing}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;
        self.tables(f)?;

        let diagnostics = outcome.diagnostics();
        if !diagnostics.is_empty() {
            writeln!(f)?;
            for report in to_reports(&diagnostics, self.source) {
                self.handler.render_report(f, &*report)?;
            }
        }

        let counts = &outcome.counts;
        writeln!(
            f,
            "\nComponents: {} tables, {} types, {} functions, {} indexes, {} views, {} triggers, {} inserts",
            counts.tables,
            counts.types,
            counts.functions,
            counts.indexes,
            counts.views,
            counts.triggers,
            counts.inserts
        )?;
        self.expectations(f)?;

        writeln!(f)?;
        if outcome.passed {
            writeln!(f, "PASSED: tables are declared in dependency order")
        } else {
            writeln!(
                f,
                "FAILED: {} ordering violation(s), {} lint error(s)",
                outcome.violations.len(),
                outcome.lint_errors()
            )
        }
    }
}

/// Serializes the outcome as pretty JSON.
pub fn to_json(outcome: &CheckOutcome) -> Result<String, LoadError> {
    serde_json::to_string_pretty(outcome).map_err(|source| LoadError::SerializeReport { source })
}
