//! Keyword recognition. SQL keywords are case-insensitive.

use super::token::TokenKind;

/// Looks up a keyword by name (case-insensitive).
pub fn lookup_keyword(name: &str) -> Option<TokenKind> {
    match name.to_ascii_uppercase().as_str() {
        "CREATE" => Some(TokenKind::Create),
        "ALTER" => Some(TokenKind::Alter),
        "INSERT" => Some(TokenKind::Insert),
        "INTO" => Some(TokenKind::Into),
        "ADD" => Some(TokenKind::Add),

        "TABLE" => Some(TokenKind::Table),
        "TYPE" => Some(TokenKind::Type),
        "FUNCTION" => Some(TokenKind::Function),
        "PROCEDURE" => Some(TokenKind::Procedure),
        "INDEX" => Some(TokenKind::Index),
        "VIEW" => Some(TokenKind::View),
        "MATERIALIZED" => Some(TokenKind::Materialized),
        "TRIGGER" => Some(TokenKind::Trigger),

        "OR" => Some(TokenKind::Or),
        "REPLACE" => Some(TokenKind::Replace),
        "IF" => Some(TokenKind::If),
        "NOT" => Some(TokenKind::Not),
        "EXISTS" => Some(TokenKind::Exists),
        "GLOBAL" => Some(TokenKind::Global),
        "LOCAL" => Some(TokenKind::Local),
        "TEMP" => Some(TokenKind::Temp),
        "TEMPORARY" => Some(TokenKind::Temporary),
        "UNLOGGED" => Some(TokenKind::Unlogged),
        "UNIQUE" => Some(TokenKind::Unique),
        "CONCURRENTLY" => Some(TokenKind::Concurrently),
        "ONLY" => Some(TokenKind::Only),

        "CONSTRAINT" => Some(TokenKind::Constraint),
        "FOREIGN" => Some(TokenKind::Foreign),
        "KEY" => Some(TokenKind::Key),
        "REFERENCES" => Some(TokenKind::References),

        _ => None,
    }
}
