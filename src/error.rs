//! Errors raised while loading inputs or emitting the report.
//!
//! The checker itself never fails; these cover the I/O around it. Every
//! variant exits with status 2, apart from a failed check's status 1.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("schema file {} not found or unreadable", .path.display())]
    #[diagnostic(
        code(input::unavailable),
        help("pass the schema path as the first argument, or run from the directory containing it")
    )]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read expectations manifest {}", .path.display())]
    #[diagnostic(code(manifest::unreadable))]
    UnreadableManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid expectations manifest {}", .path.display())]
    #[diagnostic(
        code(manifest::invalid),
        help("see the `expect` module documentation for the manifest format")
    )]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize report as JSON")]
    #[diagnostic(code(output::serialization))]
    SerializeReport {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

/// Reads the schema document at `path`.
pub fn read_schema(path: &std::path::Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}
