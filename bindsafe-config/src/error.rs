//! Error types for configuration loading.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading `bindsafe.toml`.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(bindsafe::config::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(bindsafe::config::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// A dialect section is malformed.
    #[error("invalid dialect `{name}`: {message}")]
    #[diagnostic(
        code(bindsafe::config::invalid_dialect),
        help("dialect names must be non-empty and use only ASCII letters, digits, `_` or `-`")
    )]
    InvalidDialect { name: String, message: String },

    /// `default_dialect` names a dialect that is neither built in nor configured.
    #[error("unknown default dialect `{name}`")]
    #[diagnostic(code(bindsafe::config::unknown_dialect))]
    UnknownDialect { name: String },
}

impl ConfigError {
    /// Create an invalid dialect error.
    pub fn invalid_dialect(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDialect {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unknown dialect error.
    pub fn unknown_dialect(name: impl Into<String>) -> Self {
        Self::UnknownDialect { name: name.into() }
    }
}
