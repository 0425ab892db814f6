//! Error types for statement building with actionable messages.
//!
//! Sanitizing a bind name never fails. Errors only arise when a sanitized
//! name cannot be bound safely inside one statement, or when a dialect
//! cannot be resolved.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: B{category}{number}
//! - 1xxx: Bind parameter errors (collision, duplicate, invalid)
//! - 7xxx: Configuration errors (unknown dialect)
//!
//! ```rust
//! use bindsafe_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::bind_collision("name_1");
//! assert_eq!(err.code, ErrorCode::BindNameCollision);
//! assert_eq!(err.code.code(), "B1002");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for statement operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Bind errors (1xxx)
    /// Invalid bind parameter (B1001).
    InvalidParameter = 1001,
    /// Two binds resolve to the same name (B1002).
    BindNameCollision = 1002,
    /// An explicit bind name is reused with a different value (B1003).
    DuplicateBind = 1003,

    // Configuration errors (7xxx)
    /// Invalid configuration (B7001).
    InvalidConfiguration = 7001,
    /// Dialect is not registered (B7002).
    UnknownDialect = 7002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "B1002").
    pub fn code(&self) -> String {
        format!("B{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "Invalid bind parameter",
            Self::BindNameCollision => "Bind name collision",
            Self::DuplicateBind => "Duplicate bind name",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::UnknownDialect => "Unknown dialect",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The dialect in use.
    pub dialect: Option<String>,
    /// The bind name involved.
    pub bind: Option<String>,
    /// The SQL built so far (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building a statement.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the dialect.
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.context.dialect = Some(dialect.into());
        self
    }

    /// Set the bind name.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.context.bind = Some(bind.into());
        self
    }

    /// Set the SQL built so far.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A sanitized anonymous name equals a name already bound in the statement.
    pub fn bind_collision(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::BindNameCollision,
            format!("Anonymous bind `{}` collides with an existing parameter", name),
        )
        .with_bind(&name)
        .with_suggestion("Rename the explicit parameter so it cannot match a generated name")
        .with_code_suggestion(
            "Give the anonymous value an explicit key instead",
            format!("builder.push_bind(BindName::explicit(\"{}_value\"), value)", name),
        )
    }

    /// An explicit name equals a name already generated for an anonymous bind.
    pub fn explicit_collision(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::BindNameCollision,
            format!("Explicit bind `{}` collides with a generated parameter", name),
        )
        .with_bind(&name)
        .with_suggestion("Pick an explicit key that does not end in `_<number>`")
        .with_help("Generated names have the form `{column}_{n}` after sanitization")
    }

    /// An explicit name is bound twice with different values.
    pub fn duplicate_bind(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::DuplicateBind,
            format!("Bind `{}` is already bound to a different value", name),
        )
        .with_bind(&name)
        .with_suggestion("Use a distinct key for each value")
        .with_help("Reusing a key is allowed only when the value is identical")
    }

    /// A bind name is unusable.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        Self::new(
            ErrorCode::InvalidParameter,
            format!("Invalid bind `{}`: {}", name, message),
        )
        .with_bind(&name)
    }

    /// A dialect name is not registered.
    pub fn unknown_dialect(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorCode::UnknownDialect, format!("Unknown dialect `{}`", name))
            .with_dialect(&name)
            .with_suggestion("Register the dialect with register_global_dialect() first")
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    // ============== Error Checks ==============

    /// Check if this is a collision between bind names.
    pub fn is_collision(&self) -> bool {
        matches!(self.code, ErrorCode::BindNameCollision | ErrorCode::DuplicateBind)
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidConfiguration | ErrorCode::UnknownDialect
        )
    }

    /// Get the error code.
    pub fn error_code(&self) -> &ErrorCode {
        &self.code
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref dialect) = self.context.dialect {
            output.push_str(&format!("  → Dialect: {}\n", dialect));
        }
        if let Some(ref bind) = self.context.bind {
            output.push_str(&format!("  → Bind: {}\n", bind));
        }

        // SQL (truncated if too long)
        if let Some(ref sql) = self.context.sql {
            let sql_display = match sql.char_indices().nth(200) {
                Some((idx, _)) => format!("{}...", &sql[..idx]),
                None => sql.clone(),
            };
            output.push_str(&format!("  → SQL: {}\n", sql_display));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     ```\n     {}\n     ```\n", code.replace('\n', "\n     ")));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<bindsafe_config::ConfigError> for QueryError {
    fn from(err: bindsafe_config::ConfigError) -> Self {
        QueryError::invalid_configuration(err.to_string()).with_source(err)
    }
}
