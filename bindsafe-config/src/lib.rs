//! # bindsafe-config
//!
//! Configuration for bindsafe.
//!
//! This crate provides:
//! - Parser for `bindsafe.toml` files, with `${ENV_VAR}` interpolation
//! - Per-dialect placeholder style and forbidden-character overrides
//! - Diagnostic errors for malformed configuration
//!
//! ## Example
//!
//! ```rust
//! use bindsafe_config::{BindsafeConfig, ParamStyle};
//!
//! let config = BindsafeConfig::from_str(r#"
//!     default_dialect = "acme"
//!
//!     [dialects.acme]
//!     paramstyle = "named"
//!     extra_forbidden = ":#"
//! "#).unwrap();
//!
//! let acme = config.dialect("acme").unwrap();
//! assert_eq!(acme.paramstyle, Some(ParamStyle::Named));
//! ```

pub mod config;
pub mod error;

pub use config::{BindsafeConfig, DebugConfig, DialectSettings, ParamStyle};
pub use error::{ConfigError, ConfigResult};
