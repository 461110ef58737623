//! Order validation over extracted declarations.

use crate::model::{DeclarationMap, Violation};
use tracing::debug;

/// Checks that every dependency is declared, and declared no later than its dependent.
///
/// Makes one full pass and never stops early. Violations come out in document
/// order of their subjects; for each subject a duplicate declaration is
/// reported first, then reference problems in dependency discovery order.
pub fn validate(declarations: &DeclarationMap) -> Vec<Violation> {
    let mut violations = Vec::new();

    for declaration in declarations.values() {
        if declaration.is_duplicated() {
            violations.push(Violation::DuplicateDeclaration {
                name: declaration.name.clone(),
                positions: declaration.occurrences.iter().map(|o| o.position).collect(),
                spans: declaration
                    .occurrences
                    .iter()
                    .map(|o| o.span.clone())
                    .collect(),
            });
        }

        for (target, span) in &declaration.dependencies {
            match declarations.get(target) {
                None => violations.push(Violation::UndeclaredReference {
                    subject: declaration.name.clone(),
                    subject_position: declaration.position,
                    target: target.clone(),
                    span: span.clone(),
                }),
                Some(dependency) if dependency.position > declaration.position => {
                    violations.push(Violation::ForwardReference {
                        subject: declaration.name.clone(),
                        subject_position: declaration.position,
                        target: target.clone(),
                        target_position: dependency.position,
                        span: span.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    debug!(
        declarations = declarations.len(),
        violations = violations.len(),
        "validated declaration order"
    );
    violations
}
