//! Declaration order scenarios
//!
//! End-to-end checks of `extract` + `validate` on whole schema documents:
//! the canonical pass/fail scenarios, the behavioral properties of the
//! ordering core, and documents written in the styles real schema scripts use.

mod common;

use common::{assert_no_violations, summarize, table_schema, violations_of};
use schema_lint::{Violation, ViolationKind, extract, validate};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

// ===== Canonical Scenarios =====

#[test]
fn scenario_declared_before_use_passes() {
    assert_no_violations(&table_schema(&[("roles", &[]), ("employees", &["roles"])]));
}

#[test]
fn scenario_forward_reference() {
    let doc = table_schema(&[("employees", &["roles"]), ("roles", &[])]);
    let violations = violations_of(&doc);
    assert_eq!(
        summarize(&violations),
        vec![(ViolationKind::ForwardReference, "employees".into(), some("roles"))]
    );
    assert_eq!(violations[0].subject_position(), 0);
    assert_eq!(violations[0].target_position(), Some(1));
}

#[test]
fn scenario_undeclared_reference() {
    let doc = table_schema(&[("orders", &["customers"])]);
    assert_eq!(
        summarize(&violations_of(&doc)),
        vec![(ViolationKind::UndeclaredReference, "orders".into(), some("customers"))]
    );
}

#[test]
fn scenario_duplicate_uses_first_position() {
    // `products` first appears at position 0, so `line_items` (position 1)
    // may reference it even though a second declaration comes later.
    let doc = table_schema(&[
        ("products", &[]),
        ("line_items", &["products"]),
        ("products", &[]),
    ]);
    let violations = violations_of(&doc);
    assert_eq!(
        summarize(&violations),
        vec![(ViolationKind::DuplicateDeclaration, "products".into(), None)]
    );
    match &violations[0] {
        Violation::DuplicateDeclaration { positions, .. } => assert_eq!(positions, &vec![0, 2]),
        other => panic!("unexpected violation: {other}"),
    }
}

// ===== Properties =====

#[test]
fn documents_without_declarations_are_clean() {
    for doc in [
        "",
        "   \n\t\n",
        "-- CREATE TABLE commented_out (id INT);",
        "SELECT * FROM roles; INSERT INTO roles (name) VALUES ('x');",
        "ALTER TABLE roles ADD FOREIGN KEY (x) REFERENCES other(id);",
    ] {
        assert!(extract(doc).is_empty(), "declarations found in {doc:?}");
        assert!(violations_of(doc).is_empty());
    }
}

#[test]
fn self_reference_is_never_a_violation() {
    assert_no_violations(&table_schema(&[("employees", &["employees"])]));
}

#[test]
fn repeated_declaration_reports_once() {
    for repeats in 2..6 {
        let tables: Vec<(&str, &[&str])> = (0..repeats).map(|_| ("products", &[][..])).collect();
        let violations = violations_of(&table_schema(&tables));
        assert_eq!(violations.len(), 1, "{repeats} repeats");
        match &violations[0] {
            Violation::DuplicateDeclaration { positions, spans, .. } => {
                assert_eq!(positions.len(), repeats);
                assert_eq!(spans.len(), repeats);
            }
            other => panic!("unexpected violation: {other}"),
        }
    }
}

#[test]
fn extraction_and_validation_are_deterministic() {
    let doc = table_schema(&[
        ("order_items", &["orders", "products"]),
        ("orders", &["customers"]),
        ("orders", &[]),
    ]);
    let first = validate(&extract(&doc));
    let second = validate(&extract(&doc));
    assert_eq!(first, second);
    assert_eq!(extract(&doc), extract(&doc));
}

#[test]
fn violations_follow_document_order() {
    let doc = table_schema(&[
        ("order_items", &["orders", "products"]),
        ("orders", &["customers"]),
        ("orders", &[]),
    ]);
    assert_eq!(
        summarize(&violations_of(&doc)),
        vec![
            (ViolationKind::ForwardReference, "order_items".into(), some("orders")),
            (ViolationKind::UndeclaredReference, "order_items".into(), some("products")),
            (ViolationKind::DuplicateDeclaration, "orders".into(), None),
            (ViolationKind::UndeclaredReference, "orders".into(), some("customers")),
        ]
    );
}

// ===== Real-world Styles =====

#[test]
fn mixed_case_quoting_and_schemas() {
    let doc = r#"
        Create Table "Tenants" (id serial primary key);
        CREATE TABLE public.stores (id SERIAL PRIMARY KEY);
        create unlogged table if not exists Audit_Log (
            tenant_id int references "Tenants"(id),
            store_id int references PUBLIC.STORES(id)
        );
    "#;
    let map = extract(doc);
    let names: Vec<_> = map.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["Tenants", "public.stores", "audit_log"]);
    assert!(validate(&map).is_empty());
}

#[test]
fn quoted_and_unquoted_names_differ() {
    let doc = r#"
        CREATE TABLE "Roles" (id INT);
        CREATE TABLE employees (role_id INT REFERENCES roles(id));
    "#;
    assert_eq!(
        summarize(&violations_of(doc)),
        vec![(ViolationKind::UndeclaredReference, "employees".into(), some("roles"))]
    );
}

#[test]
fn function_bodies_and_strings_hide_markers() {
    let doc = r#"
        CREATE TABLE roles (id INT);
        CREATE OR REPLACE FUNCTION make_tmp() RETURNS void AS $fn$
            CREATE TEMP TABLE scratch (r INT REFERENCES later_table(id));
        $fn$ LANGUAGE sql;
        INSERT INTO roles VALUES (1, 'CREATE TABLE fake (x INT REFERENCES nothing)');
        CREATE TABLE employees (role_id INT REFERENCES roles(id));
    "#;
    let map = extract(doc);
    assert_eq!(map.len(), 2);
    assert!(validate(&map).is_empty());
}

#[test]
fn reference_in_later_statement_belongs_to_current_table() {
    // An ALTER TABLE after `employees` is attributed to `employees`, the
    // most recent declaration, so the later `roles` is a forward reference.
    let doc = "CREATE TABLE employees (id INT, role_id INT);\n\
               ALTER TABLE employees ADD CONSTRAINT fk_role FOREIGN KEY (role_id) REFERENCES roles(id);\n\
               CREATE TABLE roles (id INT);";
    assert_eq!(
        summarize(&violations_of(doc)),
        vec![(ViolationKind::ForwardReference, "employees".into(), some("roles"))]
    );
}

#[test]
fn unterminated_input_degrades_gracefully() {
    let doc = "CREATE TABLE roles (id INT);\nCREATE TABLE employees (note TEXT DEFAULT 'oops, REFERENCES roles";
    let map = extract(doc);
    assert_eq!(map.len(), 2);
    assert!(map["employees"].dependencies.is_empty());
}

#[test]
fn privilege_grants_do_not_add_dependencies() {
    assert_no_violations(
        "CREATE TABLE roles (id INT PRIMARY KEY);\nGRANT SELECT, REFERENCES ON roles TO app_user;",
    );
    let doc = "CREATE TABLE roles (id INT PRIMARY KEY);\n\
               GRANT REFERENCES ON roles TO app_user;\n\
               CREATE TABLE employees (role_id INT REFERENCES roles(id));\n\
               REVOKE REFERENCES ON employees FROM app_user;";
    let map = extract(doc);
    assert_eq!(map.len(), 2);
    assert!(map["roles"].dependencies.is_empty());
    assert!(map["employees"].depends_on("roles"));
    assert!(validate(&map).is_empty());
}

#[test]
fn embedded_nul_finishes() {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let doc = "CREATE TABLE roles (id INT);\u{0}\n\
                   CREATE TABLE employees (r INT REFERENCES roles(id));";
        let map = extract(doc);
        let _ = tx.send((map.len(), validate(&map)));
    });
    let (declarations, violations) = rx
        .recv_timeout(Duration::from_secs(5))
        .unwrap_or_else(|e| panic!("extraction did not finish: {e}"));
    assert_eq!(declarations, 2);
    assert!(violations.is_empty(), "{violations:?}");
}
