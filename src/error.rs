//! Error types and handling for monoship
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Expected resolution outcomes (undeclared dependencies, version conflicts,
//! non-deterministic installs) are values of
//! [`crate::collector::ResolutionResult`], not errors. Errors are reserved
//! for faults the build cannot proceed from: unreadable files, malformed
//! JSON, unresolvable imports, failed child processes.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for monoship operations
#[derive(Error, Diagnostic, Debug)]
pub enum MonoshipError {
    // Configuration errors
    #[error("Cannot determine the monorepo root from {start}")]
    #[diagnostic(
        code(monoship::config::root_not_found),
        help(
            "Add a lerna.json or a package.json with a \"workspaces\" array at the monorepo root, or set \"monorepoRootPath\" in monoship.json"
        )
    )]
    MonorepoRootNotFound { start: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(monoship::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Invalid configuration file: {path}")]
    #[diagnostic(
        code(monoship::config::invalid),
        help(
            "monoship.json accepts monorepoRootPath (string), outputDirectory (string), installPackages (bool) and extraModules (array of strings)"
        )
    )]
    ConfigInvalid { path: String, reason: String },

    // Manifest errors
    #[error("Failed to read manifest: {path}")]
    #[diagnostic(code(monoship::manifest::read_failed))]
    ManifestReadFailed { path: String, reason: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(monoship::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Bundling errors
    #[error("Entry file not found: {path}")]
    #[diagnostic(code(monoship::bundle::entry_not_found))]
    EntryFileNotFound { path: String },

    #[error("Cannot resolve import '{specifier}' from {importer}")]
    #[diagnostic(
        code(monoship::bundle::unresolved_import),
        help(
            "Relative imports must point to an existing .js, .mjs, .cjs or .json file, or to a directory containing an index file"
        )
    )]
    UnresolvedImport { specifier: String, importer: String },

    #[error("Source file {path} is outside the monorepo root {root}")]
    #[diagnostic(code(monoship::bundle::outside_root))]
    SourceOutsideRoot { path: String, root: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(monoship::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(monoship::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to copy {from} to {to}")]
    #[diagnostic(code(monoship::fs::copy_failed))]
    FileCopyFailed {
        from: String,
        to: String,
        reason: String,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(monoship::fs::io_error))]
    IoError { message: String },

    // Process errors
    #[error("Failed to spawn {command}: {reason}")]
    #[diagnostic(
        code(monoship::process::spawn_failed),
        help("Check that the command is installed and on your PATH")
    )]
    ProcessSpawnFailed { command: String, reason: String },

    #[error("{command} exited with status {status}")]
    #[diagnostic(code(monoship::process::exit_failure))]
    ProcessFailed { command: String, status: i32 },
}

impl From<std::io::Error> for MonoshipError {
    fn from(err: std::io::Error) -> Self {
        MonoshipError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MonoshipError {
    fn from(err: serde_json::Error) -> Self {
        MonoshipError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MonoshipError>;
