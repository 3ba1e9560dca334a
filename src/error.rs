//! Error types for SDK generation.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Fatal errors that abort a generation run before any output is written.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is neither valid JSON nor valid YAML for its extension.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// No `servers` entry to take the base URL from.
    #[error("document declares no server URL")]
    MissingServer,

    /// A route placeholder has no path parameter of the same name.
    #[error("route {route} has placeholder {{{placeholder}}} with no matching path parameter")]
    UnboundPlaceholder {
        /// Route template as written in the document.
        route: String,
        /// Placeholder name without braces.
        placeholder: String,
    },

    /// The generator configuration is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A static template failed to render.
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    /// An output file or directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the external build/test step run on the generated crate.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// `cargo` could not be started.
    #[error("failed to spawn verifier: {0}")]
    Spawn(#[source] std::io::Error),

    /// `cargo test` ran and failed.
    #[error("verifier exited with {status}:\n{stderr}")]
    Failed {
        /// Exit status of the verifier.
        status: ExitStatus,
        /// Captured standard error.
        stderr: String,
    },
}

/// Identifier derivation failure on pathological input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The input has no characters an identifier can be built from.
    #[error("no identifier characters in {0:?}")]
    Degenerate(String),
}
