//! Statement inventory: every object a schema script creates.
//!
//! Where the extractor only follows table declarations and their references,
//! the inventory records all `CREATE` statements, foreign keys with their
//! columns, and `INSERT` statements. It backs the presence predicates, the
//! expectations manifest and the structural lints.

use crate::diag::Diag;
use crate::lexer::token::TokenKind;
use crate::lexer::tokenize;
use crate::scan::TokenStream;
use crate::span::Span;
use serde::Serialize;
use smol_str::SmolStr;
use std::fmt;
use tracing::debug;

/// Kind of object created by a `CREATE` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    Type,
    Function,
    Procedure,
    Index,
    View,
    MaterializedView,
    Trigger,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ObjectKind::Table => "table",
            ObjectKind::Type => "type",
            ObjectKind::Function => "function",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Index => "index",
            ObjectKind::View => "view",
            ObjectKind::MaterializedView => "materialized view",
            ObjectKind::Trigger => "trigger",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaObject {
    pub kind: ObjectKind,
    pub name: SmolStr,
    /// Span of the object name.
    pub span: Span,
    /// Created with `CREATE OR REPLACE`.
    pub or_replace: bool,
}

/// A foreign key, from either a `CREATE TABLE` body or `ALTER TABLE ... ADD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Table owning the key.
    pub table: SmolStr,
    /// Referencing columns; empty when they could not be determined.
    pub columns: Vec<SmolStr>,
    /// Referenced table.
    pub target: SmolStr,
    /// From `REFERENCES` through the target name.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertStatement {
    pub table: SmolStr,
    /// The whole statement, excluding the terminating `;`.
    pub span: Span,
}

/// A comma directly before the closing parenthesis of a table body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailingComma {
    pub table: SmolStr,
    pub span: Span,
}

/// Number of objects of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComponentCounts {
    pub tables: usize,
    pub types: usize,
    pub functions: usize,
    pub indexes: usize,
    pub views: usize,
    pub triggers: usize,
    pub inserts: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    pub objects: Vec<SchemaObject>,
    pub foreign_keys: Vec<ForeignKey>,
    pub inserts: Vec<InsertStatement>,
    pub trailing_commas: Vec<TrailingComma>,
    /// Lexer warnings for the scanned document.
    #[serde(skip)]
    pub diagnostics: Vec<Diag>,
}

impl Inventory {
    /// Scans every statement of `document`.
    pub fn scan(document: &str) -> Self {
        let lexed = tokenize(document);
        let mut stream = TokenStream::new(&lexed.tokens);
        let mut inventory = Inventory {
            diagnostics: lexed.diagnostics.clone(),
            ..Default::default()
        };

        while !stream.at_end() {
            let start = stream.current().span.start;
            match stream.current().kind {
                TokenKind::Create => {
                    stream.advance();
                    inventory.scan_create(&mut stream);
                }
                TokenKind::Alter if stream.peek_kind(1) == &TokenKind::Table => {
                    stream.advance();
                    stream.advance();
                    inventory.scan_alter_table(&mut stream);
                }
                TokenKind::Insert if stream.peek_kind(1) == &TokenKind::Into => {
                    stream.advance();
                    stream.advance();
                    let table = stream.qualified_name();
                    let mut end = stream.previous_span().end;
                    while !stream.at_end() && !stream.check(&TokenKind::Semicolon) {
                        end = stream.current().span.end;
                        stream.advance();
                    }
                    if let Some(table) = table {
                        inventory.inserts.push(InsertStatement {
                            table: table.node,
                            span: start..end,
                        });
                    }
                }
                _ => {}
            }
            stream.skip_statement();
        }

        debug!(
            objects = inventory.objects.len(),
            foreign_keys = inventory.foreign_keys.len(),
            inserts = inventory.inserts.len(),
            "scanned schema inventory"
        );
        inventory
    }

    /// Objects of the given kind, in document order.
    pub fn objects_of(&self, kind: ObjectKind) -> impl Iterator<Item = &SchemaObject> {
        self.objects.iter().filter(move |object| object.kind == kind)
    }

    /// Finds the first object of `kind` named `name`, ignoring ASCII case.
    pub fn find(&self, kind: ObjectKind, name: &str) -> Option<&SchemaObject> {
        self.objects_of(kind)
            .find(|object| object.name.eq_ignore_ascii_case(name))
    }

    pub fn counts(&self) -> ComponentCounts {
        let mut counts = ComponentCounts {
            inserts: self.inserts.len(),
            ..Default::default()
        };
        for object in &self.objects {
            match object.kind {
                ObjectKind::Table => counts.tables += 1,
                ObjectKind::Type => counts.types += 1,
                ObjectKind::Function | ObjectKind::Procedure => counts.functions += 1,
                ObjectKind::Index => counts.indexes += 1,
                ObjectKind::View | ObjectKind::MaterializedView => counts.views += 1,
                ObjectKind::Trigger => counts.triggers += 1,
            }
        }
        counts
    }

    /// Reads the rest of a `CREATE` statement; `CREATE` is consumed.
    fn scan_create(&mut self, stream: &mut TokenStream<'_>) {
        let or_replace = stream.consume_sequence(&[TokenKind::Or, TokenKind::Replace]);
        if matches!(stream.current().kind, TokenKind::Global | TokenKind::Local) {
            stream.advance();
        }
        if matches!(
            stream.current().kind,
            TokenKind::Temp | TokenKind::Temporary | TokenKind::Unlogged
        ) {
            stream.advance();
        }
        stream.consume(&TokenKind::Unique);
        let materialized = stream.consume(&TokenKind::Materialized);
        stream.consume(&TokenKind::Constraint);

        let kind = match stream.current().kind {
            TokenKind::Table => ObjectKind::Table,
            TokenKind::Type => ObjectKind::Type,
            TokenKind::Function => ObjectKind::Function,
            TokenKind::Procedure => ObjectKind::Procedure,
            TokenKind::Index => ObjectKind::Index,
            TokenKind::View if materialized => ObjectKind::MaterializedView,
            TokenKind::View => ObjectKind::View,
            TokenKind::Trigger => ObjectKind::Trigger,
            _ => return,
        };
        stream.advance();
        if kind == ObjectKind::Index {
            stream.consume(&TokenKind::Concurrently);
        }
        stream.consume_sequence(&[TokenKind::If, TokenKind::Not, TokenKind::Exists]);

        // `CREATE INDEX ON t (...)` has no index name.
        if kind == ObjectKind::Index && stream.current().kind.is_word("on") {
            return;
        }
        let Some(name) = stream.qualified_name() else {
            return;
        };

        self.objects.push(SchemaObject {
            kind,
            name: name.node.clone(),
            span: name.span,
            or_replace,
        });
        if kind == ObjectKind::Table {
            self.scan_table_body(stream, &name.node);
        }
    }

    /// Walks a table body collecting foreign keys and trailing commas.
    fn scan_table_body(&mut self, stream: &mut TokenStream<'_>, table: &SmolStr) {
        let mut depth = 0usize;
        let mut expect_column = false;
        let mut column: Option<SmolStr> = None;
        let mut fk_columns: Option<Vec<SmolStr>> = None;

        while !stream.at_end() && !stream.check(&TokenKind::Semicolon) {
            let token = stream.current();
            match &token.kind {
                TokenKind::LParen => {
                    depth += 1;
                    if depth == 1 {
                        expect_column = true;
                    }
                    stream.advance();
                }
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    stream.advance();
                }
                TokenKind::Comma if depth == 1 => {
                    if stream.peek_kind(1) == &TokenKind::RParen {
                        self.trailing_commas.push(TrailingComma {
                            table: table.clone(),
                            span: token.span.clone(),
                        });
                    }
                    expect_column = true;
                    column = None;
                    fk_columns = None;
                    stream.advance();
                }
                TokenKind::Foreign if stream.peek_kind(1) == &TokenKind::Key => {
                    expect_column = false;
                    stream.advance();
                    stream.advance();
                    fk_columns = Some(stream.name_list());
                }
                TokenKind::References => {
                    let columns = fk_columns
                        .take()
                        .or_else(|| column.clone().map(|c| vec![c]))
                        .unwrap_or_default();
                    self.read_reference(stream, table, columns);
                }
                kind => {
                    if expect_column && depth == 1 {
                        expect_column = false;
                        if !starts_table_constraint(kind) {
                            column = kind.as_name();
                        }
                    }
                    stream.advance();
                }
            }
        }
    }

    /// Reads `ALTER TABLE [IF EXISTS] [ONLY] name ...`; `ALTER TABLE` is consumed.
    fn scan_alter_table(&mut self, stream: &mut TokenStream<'_>) {
        stream.consume_sequence(&[TokenKind::If, TokenKind::Exists]);
        stream.consume(&TokenKind::Only);
        let Some(table) = stream.qualified_name() else {
            return;
        };

        let mut fk_columns = Vec::new();
        while !stream.at_end() && !stream.check(&TokenKind::Semicolon) {
            match stream.current().kind {
                TokenKind::Foreign if stream.peek_kind(1) == &TokenKind::Key => {
                    stream.advance();
                    stream.advance();
                    fk_columns = stream.name_list();
                }
                TokenKind::References => {
                    let columns = std::mem::take(&mut fk_columns);
                    self.read_reference(stream, &table.node, columns);
                }
                _ => stream.advance(),
            }
        }
    }

    /// Reads `REFERENCES target`; the stream is on `REFERENCES`.
    fn read_reference(
        &mut self,
        stream: &mut TokenStream<'_>,
        table: &SmolStr,
        columns: Vec<SmolStr>,
    ) {
        let start = stream.current().span.start;
        stream.advance();
        if let Some(target) = stream.qualified_name() {
            self.foreign_keys.push(ForeignKey {
                table: table.clone(),
                columns,
                target: target.node,
                span: start..target.span.end,
            });
        }
    }
}

fn starts_table_constraint(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Constraint | TokenKind::Foreign | TokenKind::Unique
    ) || ["primary", "check", "exclude", "like"]
        .iter()
        .any(|word| kind.is_word(word))
}
