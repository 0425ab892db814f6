//! # bindsafe-query
//!
//! Bind parameter naming for SQL statements.
//!
//! This crate provides:
//! - Sanitization of anonymous bind names (`sanitize`)
//! - Per-dialect placeholder styles and forbidden characters (`dialect`)
//! - Provenance-tagged bind names and the anonymizer (`bind`)
//! - A statement builder that keeps placeholders and parameter keys in sync (`sql`)
//!
//! ## Sanitizing
//!
//! Only anonymous names are touched:
//!
//! ```rust
//! use bindsafe_query::sanitize;
//!
//! assert_eq!(sanitize("My Column (2)_1", true), "MyColumn2_1");
//! assert_eq!(sanitize("123_456", true), "123_456");
//! assert_eq!(sanitize("_My Key", false), "_My Key");
//! ```
//!
//! ## Building Statements
//!
//! ```rust
//! use bindsafe_query::{BindName, SqlBuilder};
//!
//! let mut builder = SqlBuilder::oracle();
//! builder
//!     .push("UPDATE t SET total = ")
//!     .push_column_bind("Total (USD)", 10)
//!     .push(" WHERE id = ")
//!     .push_bind(BindName::explicit("id"), 1);
//!
//! let stmt = builder.build().unwrap();
//! assert_eq!(stmt.sql(), "UPDATE t SET total = :TotalUSD_1 WHERE id = :id");
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use bindsafe_query::{ErrorCode, SqlBuilder};
//!
//! let mut builder = SqlBuilder::postgres();
//! builder.push_bind("k".into(), 1).push_bind("k".into(), 2);
//!
//! let err = builder.build().unwrap_err();
//! assert_eq!(err.code, ErrorCode::DuplicateBind);
//! ```

pub mod bind;
pub mod dialect;
pub mod error;
pub mod logging;
pub mod sanitize;
pub mod sql;
pub mod value;

pub use bind::{Anonymizer, BindName, DEFAULT_SEED};
pub use dialect::{
    Dialect, DialectConfig, DialectRegistry, ParamStyle, global_default_dialect, global_dialect,
    install_global_registry, register_global_dialect,
};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use sanitize::{BASE_FORBIDDEN, ForbiddenChars, Sanitizer, sanitize};
pub use sql::{CompiledStatement, SqlBuilder, needs_quoting, quote_identifier};
pub use value::BindValue;

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_debug, init_with_level,
    is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bind::{Anonymizer, BindName};
    pub use crate::dialect::{Dialect, DialectConfig, DialectRegistry, ParamStyle};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::sanitize::{Sanitizer, sanitize};
    pub use crate::sql::{CompiledStatement, SqlBuilder};
    pub use crate::value::BindValue;
}
