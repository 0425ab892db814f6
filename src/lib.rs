//! # bindsafe
//!
//! Safe naming of anonymous SQL bind parameters.
//!
//! Bind parameters generated from column names inherit whatever characters
//! those names contain. bindsafe provides:
//! - A sanitizer that makes generated names safe for `%(name)s` assembly and
//!   for driver placeholder grammars, while leaving caller-chosen names alone
//! - Per-dialect forbidden-character sets and placeholder styles as data
//! - A statement builder that uses the same sanitized name in the SQL text
//!   and in the parameter mapping, and reports name collisions
//! - `bindsafe.toml` configuration for overriding and adding dialects
//!
//! ## Quick Start
//!
//! ```rust
//! use bindsafe::prelude::*;
//!
//! let mut builder = SqlBuilder::postgres();
//! builder
//!     .push("INSERT INTO t (\"My Column (2)\") VALUES (")
//!     .push_column_bind("My Column (2)", 5)
//!     .push(")");
//!
//! let stmt = builder.build()?;
//! assert_eq!(stmt.sql(), "INSERT INTO t (\"My Column (2)\") VALUES (%(MyColumn2_1)s)");
//! # Ok::<(), bindsafe::QueryError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Configuration file types.
pub mod config {
    pub use bindsafe_config::*;
}

/// Sanitizer, dialects and statement building.
pub mod query {
    pub use bindsafe_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::BindsafeConfig;
    pub use bindsafe_query::prelude::*;
}

// Re-export key types at the crate root
pub use config::{BindsafeConfig, ConfigError};
pub use query::{
    BindName, CompiledStatement, Dialect, DialectConfig, DialectRegistry, ParamStyle, QueryError,
    QueryResult, Sanitizer, SqlBuilder, sanitize,
};
