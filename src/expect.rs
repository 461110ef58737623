//! Expected schema components, declared in a JSON manifest.
//!
//! A manifest lists the tables, types, functions, indexes, views, foreign keys
//! and sample rows a schema must provide:
//!
//! ```json
//! {
//!   "tables": ["roles", "employee_roles"],
//!   "functions": ["employee_has_permission"],
//!   "foreign_keys": [
//!     { "table": "employee_roles", "column": "role_id", "references": "roles" }
//!   ],
//!   "sample_data": [{ "table": "roles", "contains": ["Manager"] }],
//!   "pass_threshold": 80.0
//! }
//! ```

use crate::error::LoadError;
use crate::inventory::Inventory;
use crate::presence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Success rate at or above which an incomplete schema still counts as mostly complete.
pub const MOSTLY_COMPLETE_RATE: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectations {
    pub tables: Vec<String>,
    pub types: Vec<String>,
    pub functions: Vec<String>,
    pub indexes: Vec<String>,
    pub views: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyExpectation>,
    pub sample_data: Vec<SampleDataExpectation>,
    /// Minimum success rate, in percent, for the manifest to pass.
    pub pass_threshold: f64,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            types: Vec::new(),
            functions: Vec::new(),
            indexes: Vec::new(),
            views: Vec::new(),
            foreign_keys: Vec::new(),
            sample_data: Vec::new(),
            pass_threshold: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyExpectation {
    pub table: String,
    pub column: String,
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SampleDataExpectation {
    pub table: String,
    /// Fragments that must appear, in order, in one `INSERT` into `table`.
    #[serde(default)]
    pub contains: Vec<String>,
}

/// A single expected component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    Table { name: String },
    Type { name: String },
    Function { name: String },
    Index { name: String },
    View { name: String },
    ForeignKey(ForeignKeyExpectation),
    SampleData(SampleDataExpectation),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Table { name } => write!(f, "table {name}"),
            Expectation::Type { name } => write!(f, "type {name}"),
            Expectation::Function { name } => write!(f, "function {name}()"),
            Expectation::Index { name } => write!(f, "index {name}"),
            Expectation::View { name } => write!(f, "view {name}"),
            Expectation::ForeignKey(fk) => {
                write!(f, "foreign key {}.{} -> {}", fk.table, fk.column, fk.references)
            }
            Expectation::SampleData(sample) if sample.contains.is_empty() => {
                write!(f, "sample data in {}", sample.table)
            }
            Expectation::SampleData(sample) => {
                write!(f, "sample data in {} ({})", sample.table, sample.contains.join(" .. "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationResult {
    pub expectation: Expectation,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Complete,
    MostlyComplete,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationReport {
    pub results: Vec<ExpectationResult>,
    pub pass_threshold: f64,
}

impl ExpectationReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.satisfied).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Percentage of satisfied expectations; an empty manifest is 100 %.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            100.0
        } else {
            self.passed() as f64 * 100.0 / self.total() as f64
        }
    }

    pub fn verdict(&self) -> Verdict {
        let rate = self.success_rate();
        if self.passed() == self.total() {
            Verdict::Complete
        } else if rate >= MOSTLY_COMPLETE_RATE {
            Verdict::MostlyComplete
        } else {
            Verdict::Incomplete
        }
    }

    pub fn is_passing(&self) -> bool {
        self.success_rate() >= self.pass_threshold
    }

    pub fn missing(&self) -> impl Iterator<Item = &Expectation> {
        self.results
            .iter()
            .filter(|r| !r.satisfied)
            .map(|r| &r.expectation)
    }
}

impl Expectations {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads a manifest file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::UnreadableManifest {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| LoadError::InvalidManifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every expectation in manifest order: tables, types, functions, indexes,
    /// views, foreign keys, then sample data.
    pub fn expectations(&self) -> Vec<Expectation> {
        let named = |names: &[String], make: fn(String) -> Expectation| {
            names.iter().cloned().map(make).collect::<Vec<_>>()
        };
        let mut all = Vec::new();
        all.extend(named(&self.tables, |name| Expectation::Table { name }));
        all.extend(named(&self.types, |name| Expectation::Type { name }));
        all.extend(named(&self.functions, |name| Expectation::Function { name }));
        all.extend(named(&self.indexes, |name| Expectation::Index { name }));
        all.extend(named(&self.views, |name| Expectation::View { name }));
        all.extend(self.foreign_keys.iter().cloned().map(Expectation::ForeignKey));
        all.extend(self.sample_data.iter().cloned().map(Expectation::SampleData));
        all
    }

    /// Checks every expectation against a scanned schema.
    ///
    /// `document` must be the text `inventory` was scanned from.
    pub fn evaluate(&self, inventory: &Inventory, document: &str) -> ExpectationReport {
        let results: Vec<_> = self
            .expectations()
            .into_iter()
            .map(|expectation| {
                let satisfied = is_satisfied(&expectation, inventory, document);
                ExpectationResult {
                    expectation,
                    satisfied,
                }
            })
            .collect();

        let report = ExpectationReport {
            results,
            pass_threshold: self.pass_threshold,
        };
        debug!(
            passed = report.passed(),
            total = report.total(),
            "evaluated expectations"
        );
        report
    }
}

fn is_satisfied(expectation: &Expectation, inventory: &Inventory, document: &str) -> bool {
    match expectation {
        Expectation::Table { name } => presence::has_table(inventory, name),
        Expectation::Type { name } => presence::has_type(inventory, name),
        Expectation::Function { name } => presence::has_function(inventory, name),
        Expectation::Index { name } => presence::has_index(inventory, name),
        Expectation::View { name } => presence::has_view(inventory, name),
        Expectation::ForeignKey(fk) => {
            presence::has_foreign_key(inventory, &fk.table, &fk.column, &fk.references)
        }
        Expectation::SampleData(sample) => {
            presence::has_sample_data(inventory, document, &sample.table, &sample.contains)
        }
    }
}
