//! Full schema check: ordering core plus inventory lints and expectations.

use crate::diag::{Diag, DiagSeverity};
use crate::expect::{ExpectationReport, Expectations};
use crate::extract::{ExtractConfig, extract_with};
use crate::inventory::{ComponentCounts, Inventory};
use crate::lint::lint;
use crate::model::{DeclarationMap, Violation};
use crate::report::violation_diag;
use crate::validate::validate;
use serde::Serialize;
use tracing::info;

/// Configuration for a full check.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub extract: ExtractConfig,
    /// Run the structural lints.
    pub lint: bool,
    /// Components the schema must provide.
    pub expectations: Option<Expectations>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            lint: true,
            expectations: None,
        }
    }
}

impl CheckConfig {
    pub fn with_extract_config(mut self, extract: ExtractConfig) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_lint(mut self, enabled: bool) -> Self {
        self.lint = enabled;
        self
    }

    pub fn with_expectations(mut self, expectations: Expectations) -> Self {
        self.expectations = Some(expectations);
        self
    }
}

/// Everything one check run found.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub declarations: DeclarationMap,
    pub violations: Vec<Violation>,
    /// Lint findings and lexer warnings.
    pub findings: Vec<Diag>,
    pub counts: ComponentCounts,
    pub expectations: Option<ExpectationReport>,
    pub passed: bool,
}

impl CheckOutcome {
    pub fn lint_errors(&self) -> usize {
        self.findings
            .iter()
            .filter(|d| d.severity == DiagSeverity::Error)
            .count()
    }

    /// Ordering violations followed by findings, as renderable diagnostics.
    pub fn diagnostics(&self) -> Vec<Diag> {
        self.violations
            .iter()
            .map(|v| violation_diag(v, &self.declarations))
            .chain(self.findings.iter().cloned())
            .collect()
    }
}

/// Runs the ordering core, then the inventory lints and expectations.
///
/// The run passes when there are no ordering violations, no lint errors, and
/// the expectations (if any) meet their threshold.
pub fn check(document: &str, config: &CheckConfig) -> CheckOutcome {
    let declarations = extract_with(document, &config.extract);
    let violations = validate(&declarations);

    let inventory = Inventory::scan(document);
    let mut findings = inventory.diagnostics.clone();
    if config.lint {
        findings.extend(lint(&inventory));
    }
    let expectations = config
        .expectations
        .as_ref()
        .map(|manifest| manifest.evaluate(&inventory, document));

    let passed = violations.is_empty()
        && !findings.iter().any(Diag::is_error)
        && expectations.as_ref().is_none_or(ExpectationReport::is_passing);

    info!(
        declarations = declarations.len(),
        violations = violations.len(),
        findings = findings.len(),
        passed,
        "schema check finished"
    );

    CheckOutcome {
        declarations,
        violations,
        findings,
        counts: inventory.counts(),
        expectations,
        passed,
    }
}
