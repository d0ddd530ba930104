//! Error types and handling for rollout
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Fatal/precondition errors (bad archive path, unknown project, malformed
//! mapping expression) surface through [`Result`]. Failures scoped to a single
//! component never appear here — they are carried as data inside
//! [`crate::result::ComponentResult`].

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for rollout operations
#[derive(Error, Diagnostic, Debug)]
pub enum RolloutError {
    // Archive errors
    #[error("Archive not found: {path}")]
    #[diagnostic(
        code(rollout::archive::not_found),
        help("Check that the archive path is correct and points to a regular file")
    )]
    ArchiveNotFound { path: String },

    #[error("Failed to install archive '{path}': {reason}")]
    #[diagnostic(code(rollout::archive::install_failed))]
    ArchiveInstallFailed { path: String, reason: String },

    // Parameter errors
    #[error("Configuration file for '{component}' not found: {path}")]
    #[diagnostic(code(rollout::params::config_not_found))]
    ConfigFileNotFound { component: String, path: String },

    #[error("Configuration file for '{component}' is not a regular file: {path}")]
    #[diagnostic(code(rollout::params::config_not_a_file))]
    ConfigFileNotRegular { component: String, path: String },

    #[error("Invalid entry '{entry}' in {list}")]
    #[diagnostic(
        code(rollout::params::invalid_entry),
        help("Entries take the form name=path, separated by commas")
    )]
    InvalidListEntry { list: String, entry: String },

    #[error("Unknown web scope: {scope}")]
    #[diagnostic(
        code(rollout::scope::unknown),
        help("Valid scopes: preview, staging, webedit, live, global(<name>)")
    )]
    UnknownScope { scope: String },

    #[error("Project '{name}' not found in the target environment")]
    #[diagnostic(code(rollout::project::not_found))]
    ProjectNotFound { name: String },

    // Layer mapping errors
    #[error("Invalid layer mapping expression '{expression}': {reason}")]
    #[diagnostic(
        code(rollout::layers::invalid_expression),
        help("Expected src=dst pairs separated by commas, e.g. \"layerA=dbA,*=fallback\"")
    )]
    InvalidMappingExpression { expression: String, reason: String },

    #[error("No fallback layer")]
    #[diagnostic(code(rollout::layers::no_fallback))]
    NoFallbackLayer,

    #[error("Wildcard must not be here")]
    #[diagnostic(code(rollout::layers::unexpected_wildcard))]
    UnexpectedWildcard,

    #[error("Failed to parse layer inventory: {path}")]
    #[diagnostic(code(rollout::layers::inventory_parse_failed))]
    InventoryParseFailed { path: String, reason: String },

    // Environment errors
    #[error("Environment call '{operation}' failed: {message}")]
    #[diagnostic(code(rollout::environment::call_failed))]
    Environment { operation: String, message: String },

    // Batch configuration errors
    #[error("Failed to read batch configuration: {path}")]
    #[diagnostic(code(rollout::batch::read_failed))]
    BatchConfigRead { path: String, reason: String },

    #[error("Failed to parse batch configuration: {path}")]
    #[diagnostic(code(rollout::batch::parse_failed))]
    BatchConfigParse { path: String, reason: String },

    #[error("{failed} of {total} batch entries failed validation")]
    #[diagnostic(code(rollout::batch::validation_failed))]
    ValidationFailed { failed: usize, total: usize },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(rollout::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(rollout::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for RolloutError {
    fn from(err: std::io::Error) -> Self {
        RolloutError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RolloutError {
    fn from(err: serde_json::Error) -> Self {
        RolloutError::BatchConfigParse {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, RolloutError>;
