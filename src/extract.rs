//! Entity extraction: table declarations and their foreign-key references.
//!
//! The extractor makes one forward pass over the token stream, keeping the
//! most recently opened declaration as an accumulator. A declaration marker
//! (`CREATE ... TABLE name`) opens a new current entity and receives the next
//! ordinal; every `REFERENCES name` seen before the next marker is attributed
//! to the current entity.
//!
//! Attribution follows document position, not statement targets: a later
//! `ALTER TABLE x ADD FOREIGN KEY (...) REFERENCES y` counts as a dependency
//! of the most recently declared table, whichever table `x` names.
//! Privilege statements (`GRANT ... REFERENCES ON t`, `REVOKE ...`) are
//! skipped and never contribute dependencies.

use crate::lexer::token::TokenKind;
use crate::lexer::tokenize;
use crate::model::{Declaration, DeclarationMap, Occurrence};
use crate::scan::TokenStream;
use crate::span::Spanned;
use smol_str::SmolStr;
use tracing::{debug, trace};

/// Configuration for entity extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Only count `FOREIGN KEY (...) REFERENCES t` clauses as dependencies,
    /// ignoring inline column references such as `role_id INT REFERENCES roles`.
    pub foreign_key_clause_only: bool,
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_foreign_key_clause_only(mut self, enabled: bool) -> Self {
        self.foreign_key_clause_only = enabled;
        self
    }
}

/// Extracts declarations with the default configuration.
pub fn extract(document: &str) -> DeclarationMap {
    extract_with(document, &ExtractConfig::default())
}

/// Extracts declarations from `document`.
///
/// Never fails: a document without declaration markers yields an empty map.
/// A `REFERENCES` outside any `CREATE TABLE`, for example in an
/// `ALTER TABLE ... ADD FOREIGN KEY`, is attributed to the most recently
/// declared table rather than to the altered one, and is dropped when no
/// table has been declared yet.
pub fn extract_with(document: &str, config: &ExtractConfig) -> DeclarationMap {
    let lexed = tokenize(document);
    let mut stream = TokenStream::new(&lexed.tokens);
    let mut extractor = Extractor::new(config);

    let mut statement_start = true;
    while !stream.at_end() {
        if statement_start && is_privilege_statement(&stream.current().kind) {
            stream.skip_statement();
            continue;
        }
        statement_start = false;

        if let Some(name) = declaration_marker(&mut stream) {
            extractor.open(name);
            continue;
        }

        match stream.current().kind {
            TokenKind::Foreign if stream.peek_kind(1) == &TokenKind::Key => {
                stream.advance();
                stream.advance();
                stream.name_list();
                extractor.pending_foreign_key = true;
            }
            // `REFERENCES ON t` is the privilege, not a foreign key.
            TokenKind::References if !stream.peek_kind(1).is_word("on") => {
                stream.advance();
                if let Some(target) = stream.qualified_name() {
                    extractor.reference(target);
                }
                extractor.pending_foreign_key = false;
            }
            TokenKind::Comma => {
                extractor.pending_foreign_key = false;
                stream.advance();
            }
            TokenKind::Semicolon => {
                extractor.pending_foreign_key = false;
                statement_start = true;
                stream.advance();
            }
            _ => stream.advance(),
        }
    }

    debug!(
        declarations = extractor.declarations.len(),
        markers = extractor.next_position,
        "extracted declarations"
    );
    extractor.declarations
}

fn is_privilege_statement(kind: &TokenKind) -> bool {
    kind.is_word("grant") || kind.is_word("revoke")
}

/// Recognizes `CREATE [OR REPLACE] [GLOBAL|LOCAL] [TEMP|TEMPORARY|UNLOGGED]
/// TABLE [IF NOT EXISTS] name` and returns the name.
///
/// Leaves the stream untouched when the current tokens are not a marker.
fn declaration_marker(stream: &mut TokenStream<'_>) -> Option<Spanned<SmolStr>> {
    if !stream.check(&TokenKind::Create) {
        return None;
    }

    let mut ahead = 1;
    if stream.peek_kind(ahead) == &TokenKind::Or && stream.peek_kind(ahead + 1) == &TokenKind::Replace
    {
        ahead += 2;
    }
    if matches!(stream.peek_kind(ahead), TokenKind::Global | TokenKind::Local) {
        ahead += 1;
    }
    if matches!(
        stream.peek_kind(ahead),
        TokenKind::Temp | TokenKind::Temporary | TokenKind::Unlogged
    ) {
        ahead += 1;
    }
    if stream.peek_kind(ahead) != &TokenKind::Table {
        return None;
    }

    for _ in 0..=ahead {
        stream.advance();
    }
    stream.consume_sequence(&[TokenKind::If, TokenKind::Not, TokenKind::Exists]);
    stream.qualified_name()
}

/// Accumulator for one extraction pass.
struct Extractor<'c> {
    config: &'c ExtractConfig,
    declarations: DeclarationMap,
    /// Key of the most recently opened declaration.
    current: Option<SmolStr>,
    next_position: usize,
    pending_foreign_key: bool,
}

impl<'c> Extractor<'c> {
    fn new(config: &'c ExtractConfig) -> Self {
        Self {
            config,
            declarations: DeclarationMap::new(),
            current: None,
            next_position: 0,
            pending_foreign_key: false,
        }
    }

    fn open(&mut self, name: Spanned<SmolStr>) {
        let position = self.next_position;
        self.next_position += 1;
        self.pending_foreign_key = false;

        trace!(name = %name.node, position, "declaration");
        match self.declarations.get_mut(&name.node) {
            Some(existing) => existing.occurrences.push(Occurrence {
                position,
                span: name.span,
            }),
            None => {
                self.declarations.insert(
                    name.node.clone(),
                    Declaration::new(name.node.clone(), position, name.span),
                );
            }
        }
        self.current = Some(name.node);
    }

    fn reference(&mut self, target: Spanned<SmolStr>) {
        if self.config.foreign_key_clause_only && !self.pending_foreign_key {
            return;
        }
        let Some(current) = self.current.as_ref() else {
            return;
        };
        if *current == target.node {
            return;
        }
        if let Some(declaration) = self.declarations.get_mut(current) {
            trace!(subject = %current, target = %target.node, "dependency");
            declaration
                .dependencies
                .entry(target.node)
                .or_insert(target.span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(map: &DeclarationMap, name: &str) -> Vec<String> {
        map[name].dependencies.keys().map(|k| k.to_string()).collect()
    }

    #[test]
    fn empty_document() {
        assert!(extract("").is_empty());
        assert!(extract("-- nothing here\nSELECT 1;").is_empty());
    }

    #[test]
    fn positions_follow_document_order() {
        let map = extract(
            "CREATE TABLE IF NOT EXISTS roles (id SERIAL PRIMARY KEY);\n\
             create table employees (id serial primary key);",
        );
        let names: Vec<_> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["roles", "employees"]);
        assert_eq!(map["roles"].position, 0);
        assert_eq!(map["employees"].position, 1);
    }

    #[test]
    fn marker_variants() {
        let map = extract(
            "CREATE UNLOGGED TABLE a (x INT);\n\
             CREATE GLOBAL TEMPORARY TABLE b (x INT);\n\
             CREATE TEMP TABLE IF NOT EXISTS public.c (x INT);\n\
             CREATE TABLE \"Mixed\" (x INT);\n\
             CREATE INDEX idx_a ON a (x);\n\
             CREATE VIEW v AS SELECT 1;",
        );
        let names: Vec<_> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "public.c", "Mixed"]);
    }

    #[test]
    fn multi_line_foreign_key_clause() {
        let map = extract(
            "CREATE TABLE roles (id INT);\n\
             CREATE TABLE employees (\n\
               role_id INT,\n\
               FOREIGN KEY\n  (role_id)\n  REFERENCES\n  roles (id)\n\
             );",
        );
        assert_eq!(deps(&map, "employees"), vec!["roles"]);
    }

    #[test]
    fn inline_references_and_clause_only_mode() {
        let source = "CREATE TABLE roles (id INT);\n\
                      CREATE TABLE employees (role_id INT REFERENCES roles(id));";
        assert_eq!(deps(&extract(source), "employees"), vec!["roles"]);

        let config = ExtractConfig::new().with_foreign_key_clause_only(true);
        assert!(extract_with(source, &config)["employees"].dependencies.is_empty());
    }

    #[test]
    fn clause_only_mode_handles_composite_keys() {
        let source = "CREATE TABLE shifts (store_id INT, day DATE, PRIMARY KEY (store_id, day));\n\
                      CREATE TABLE assignments (\n\
                          store_id INT, day DATE,\n\
                          FOREIGN KEY (store_id, day) REFERENCES shifts (store_id, day)\n\
                      );";
        let config = ExtractConfig::new().with_foreign_key_clause_only(true);
        assert_eq!(deps(&extract_with(source, &config), "assignments"), vec!["shifts"]);
    }

    #[test]
    fn self_reference_is_excluded() {
        let map = extract(
            "CREATE TABLE categories (\n\
               id INT PRIMARY KEY,\n\
               parent_id INT,\n\
               FOREIGN KEY (parent_id) REFERENCES categories(id)\n\
             );",
        );
        assert!(map["categories"].dependencies.is_empty());
    }

    #[test]
    fn dependencies_deduplicate_in_discovery_order() {
        let map = extract(
            "CREATE TABLE transfers (\n\
               from_id INT REFERENCES accounts(id),\n\
               currency CHAR(3) REFERENCES currencies(code),\n\
               to_id INT REFERENCES accounts(id)\n\
             );",
        );
        assert_eq!(deps(&map, "transfers"), vec!["accounts", "currencies"]);
    }

    #[test]
    fn markers_inside_strings_comments_and_bodies_are_ignored() {
        let map = extract(
            "-- CREATE TABLE ghost (x INT);\n\
             CREATE TABLE notes (body TEXT DEFAULT 'CREATE TABLE fake (x INT)');\n\
             CREATE FUNCTION f() RETURNS void AS $$\n\
               CREATE TABLE inner_t (id INT REFERENCES nowhere(id));\n\
             $$ LANGUAGE sql;",
        );
        let names: Vec<_> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["notes"]);
        assert!(map["notes"].dependencies.is_empty());
    }

    #[test]
    fn duplicates_keep_first_position_and_merge_dependencies() {
        let map = extract(
            "CREATE TABLE products (id INT);\n\
             CREATE TABLE categories (id INT);\n\
             CREATE TABLE products (category_id INT REFERENCES categories(id));",
        );
        assert_eq!(map.len(), 2);
        let products = &map["products"];
        assert_eq!(products.position, 0);
        assert_eq!(
            products
                .occurrences
                .iter()
                .map(|o| o.position)
                .collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert!(products.depends_on("categories"));
        assert_eq!(map["categories"].position, 1);
    }

    #[test]
    fn references_before_any_declaration_are_dropped() {
        let map = extract(
            "ALTER TABLE x ADD FOREIGN KEY (y) REFERENCES z(id);\nCREATE TABLE z (id INT);",
        );
        assert!(map["z"].dependencies.is_empty());
    }

    #[test]
    fn alter_table_reference_counts_for_latest_declaration() {
        let map = extract(
            "CREATE TABLE employees (id INT, role_id INT);\n\
             CREATE TABLE shifts (id INT);\n\
             ALTER TABLE employees ADD FOREIGN KEY (role_id) REFERENCES roles(id);",
        );
        assert!(map["employees"].dependencies.is_empty());
        assert_eq!(deps(&map, "shifts"), vec!["roles"]);
    }

    #[test]
    fn privilege_references_are_not_dependencies() {
        let map = extract(
            "CREATE TABLE roles (id INT PRIMARY KEY);\n\
             GRANT SELECT, REFERENCES ON roles TO app_user;\n\
             REVOKE REFERENCES (id) ON TABLE roles FROM app_user;\n\
             grant references on all tables in schema public to auditor;\n\
             ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT REFERENCES ON TABLES TO app_user;",
        );
        assert_eq!(map.len(), 1);
        assert!(map["roles"].dependencies.is_empty());
        assert!(crate::validate::validate(&map).is_empty());
    }

    #[test]
    fn declarations_after_privilege_statements_still_count() {
        let map = extract(
            "GRANT USAGE ON SCHEMA public TO app_user;\n\
             CREATE TABLE roles (id INT);\n\
             GRANT REFERENCES ON roles TO app_user;\n\
             CREATE TABLE employees (role_id INT REFERENCES roles(id));",
        );
        assert_eq!(map.len(), 2);
        assert_eq!(deps(&map, "employees"), vec!["roles"]);
    }

    #[test]
    fn reference_span_points_at_target() {
        let source = "CREATE TABLE a (b_id INT REFERENCES b(id));";
        let map = extract(source);
        let span = map["a"].dependencies["b"].clone();
        assert_eq!(&source[span], "b");
    }
}
