//! Presence predicates over an extracted schema.
//!
//! These are independent, stateless queries ("does table X exist", "is there
//! sample data for Y") used by the expectations manifest and by callers that
//! want ad hoc existence checks. Names compare ignoring ASCII case.

use crate::inventory::{Inventory, ObjectKind};
use crate::model::DeclarationMap;

/// Returns true if `name` is a declared entity in the ordering map.
pub fn declared(declarations: &DeclarationMap, name: &str) -> bool {
    declarations.contains_key(name)
        || declarations
            .keys()
            .any(|declared| declared.eq_ignore_ascii_case(name))
}

pub fn has_table(inventory: &Inventory, name: &str) -> bool {
    inventory.find(ObjectKind::Table, name).is_some()
}

pub fn has_type(inventory: &Inventory, name: &str) -> bool {
    inventory.find(ObjectKind::Type, name).is_some()
}

/// Functions and procedures both count.
pub fn has_function(inventory: &Inventory, name: &str) -> bool {
    inventory.find(ObjectKind::Function, name).is_some()
        || inventory.find(ObjectKind::Procedure, name).is_some()
}

pub fn has_index(inventory: &Inventory, name: &str) -> bool {
    inventory.find(ObjectKind::Index, name).is_some()
}

/// Plain and materialized views both count.
pub fn has_view(inventory: &Inventory, name: &str) -> bool {
    inventory.find(ObjectKind::View, name).is_some()
        || inventory.find(ObjectKind::MaterializedView, name).is_some()
}

/// Returns true if `table.column` has a foreign key to `target`.
///
/// A schema-qualified target (`public.roles`) matches an unqualified
/// `target` on its last component.
pub fn has_foreign_key(inventory: &Inventory, table: &str, column: &str, target: &str) -> bool {
    inventory.foreign_keys.iter().any(|fk| {
        fk.table.eq_ignore_ascii_case(table)
            && same_object(&fk.target, target)
            && fk.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    })
}

/// Returns true if some `INSERT INTO table` statement contains every fragment,
/// in order, ignoring case.
///
/// `document` must be the text the inventory was scanned from.
pub fn has_sample_data(
    inventory: &Inventory,
    document: &str,
    table: &str,
    fragments: &[String],
) -> bool {
    inventory
        .inserts
        .iter()
        .filter(|insert| insert.table.eq_ignore_ascii_case(table))
        .filter_map(|insert| document.get(insert.span.clone()))
        .any(|statement| contains_in_order(statement, fragments))
}

fn contains_in_order(haystack: &str, fragments: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    let mut rest = haystack.as_str();
    for fragment in fragments {
        let needle = fragment.to_lowercase();
        match rest.find(&needle) {
            Some(index) => rest = &rest[index + needle.len()..],
            None => return false,
        }
    }
    true
}

fn same_object(found: &str, wanted: &str) -> bool {
    if found.eq_ignore_ascii_case(wanted) {
        return true;
    }
    !wanted.contains('.')
        && found
            .rsplit_once('.')
            .is_some_and(|(_, last)| last.eq_ignore_ascii_case(wanted))
}
