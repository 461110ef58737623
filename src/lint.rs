//! Structural lints over the statement inventory.

use crate::diag::Diag;
use crate::inventory::{Inventory, ObjectKind};
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Runs every lint and returns the findings in document order per lint.
pub fn lint(inventory: &Inventory) -> Vec<Diag> {
    let mut diagnostics = Vec::new();
    duplicate_types(inventory, &mut diagnostics);
    trailing_commas(inventory, &mut diagnostics);
    functions_without_replace(inventory, &mut diagnostics);
    diagnostics
}

/// `CREATE TYPE` fails outright when the type exists; there is no `IF NOT EXISTS`.
fn duplicate_types(inventory: &Inventory, out: &mut Vec<Diag>) {
    let mut seen: IndexMap<SmolStr, Vec<_>> = IndexMap::new();
    for object in inventory.objects_of(ObjectKind::Type) {
        seen.entry(object.name.clone())
            .or_default()
            .push(object.span.clone());
    }

    for (name, spans) in seen.into_iter().filter(|(_, spans)| spans.len() > 1) {
        let mut diag = Diag::error(format!(
            "type '{name}' is defined {} times",
            spans.len()
        ))
        .with_code("schema::duplicate_type")
        .with_help("keep a single CREATE TYPE, or drop the type before recreating it");
        for (i, span) in spans.into_iter().enumerate() {
            diag = if i == 0 {
                diag.with_secondary_label(span, "first defined here")
            } else {
                diag.with_primary_label(span, "defined again here")
            };
        }
        out.push(diag);
    }
}

fn trailing_commas(inventory: &Inventory, out: &mut Vec<Diag>) {
    for comma in &inventory.trailing_commas {
        out.push(
            Diag::error(format!(
                "trailing comma before closing parenthesis in table '{}'",
                comma.table
            ))
            .with_primary_label(comma.span.clone(), "remove this comma")
            .with_code("schema::trailing_comma"),
        );
    }
}

fn functions_without_replace(inventory: &Inventory, out: &mut Vec<Diag>) {
    for function in inventory
        .objects
        .iter()
        .filter(|o| matches!(o.kind, ObjectKind::Function | ObjectKind::Procedure))
        .filter(|o| !o.or_replace)
    {
        out.push(
            Diag::warning(format!("{} '{}' is created without OR REPLACE", function.kind, function.name))
                .with_primary_label(function.span.clone(), "re-running the script fails here")
                .with_code("schema::function_without_replace")
                .with_help("use CREATE OR REPLACE so the script can be applied more than once"),
        );
    }
}
