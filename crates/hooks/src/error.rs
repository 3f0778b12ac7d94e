//! Error types for the envscope-hooks crate

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for envscope-hooks operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(envscope_hooks::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(envscope_hooks::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// Hook configuration file could not be parsed
    #[error("Failed to parse hook configuration{}: {message}", display_path(.path.as_deref()))]
    #[diagnostic(
        code(envscope_hooks::config::parse),
        help("Each [[hook]] needs `tag`, `source` and `target`; `policy` is optional")
    )]
    Parse {
        /// The file being parsed, if it came from disk
        path: Option<Box<std::path::Path>>,
        /// Parser error message
        message: String,
    },

    /// A hook entry did not form a valid secret binding
    #[error("Invalid hook for tag '@{tag}': {source}")]
    #[diagnostic(code(envscope_hooks::config::binding))]
    Secret {
        /// Tag of the offending hook
        tag: String,
        /// The underlying binding error
        #[source]
        source: envscope_secrets::SecretError,
    },
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Parse {
            path: path.map(PathBuf::into_boxed_path),
            message: message.into(),
        }
    }

    /// Wrap a binding error with the tag it was declared under
    pub fn secret(tag: impl Into<String>, source: envscope_secrets::SecretError) -> Self {
        Self::Secret {
            tag: tag.into(),
            source,
        }
    }
}

fn display_path(path: Option<&std::path::Path>) -> String {
    path.map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Result type for envscope-hooks operations
pub type Result<T> = std::result::Result<T, Error>;
