//! Dialect configuration: placeholder syntax and forbidden characters.
//!
//! Each dialect is plain data. The sanitizer never branches on a dialect;
//! it is handed the dialect's [`ForbiddenChars`] instead, so a new driver
//! only needs a new [`DialectConfig`].
//!
//! | dialect      | paramstyle | extra forbidden              | driver quotes names |
//! |--------------|------------|------------------------------|---------------------|
//! | `generic`    | pyformat   |                              | no                  |
//! | `postgresql` | pyformat   | `$ : [ ] . " '` + whitespace | no                  |
//! | `mysql`      | format     | `: [ ] . " '` + whitespace   | no                  |
//! | `sqlite`     | qmark      | `: [ ] $ @ . " '` + whitespace | no                |
//! | `oracle`     | named      | `: "` + whitespace           | yes                 |
//! | `mssql`      | qmark      | `@ : [ ] . " '` + whitespace | no                  |
//!
//! ```rust
//! use bindsafe_query::dialect::{Dialect, ParamStyle};
//!
//! let pg = Dialect::PostgreSQL.config();
//! assert_eq!(pg.paramstyle(), ParamStyle::Pyformat);
//! assert_eq!(pg.sanitizer().sanitize_anonymous("price ($)_1"), "price_1");
//! ```

use bindsafe_config::{BindsafeConfig, ConfigError, ConfigResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{QueryError, QueryResult};
use crate::sanitize::{ForbiddenChars, Sanitizer};

pub use bindsafe_config::ParamStyle;

const WHITESPACE: [char; 3] = ['\t', '\n', '\r'];

/// Built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// No extra restrictions beyond the base set.
    Generic,
    /// PostgreSQL through a pyformat driver. The driver does not quote bind
    /// names, so it relies on sanitization alone.
    PostgreSQL,
    /// MySQL / MariaDB.
    MySQL,
    /// SQLite.
    SQLite,
    /// Oracle. The driver quotes special bind names on its own.
    Oracle,
    /// Microsoft SQL Server.
    MsSql,
}

impl Dialect {
    /// All built-in dialects.
    pub const ALL: [Dialect; 6] = [
        Self::Generic,
        Self::PostgreSQL,
        Self::MySQL,
        Self::SQLite,
        Self::Oracle,
        Self::MsSql,
    ];

    /// Registry id of this dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
            Self::Oracle => "oracle",
            Self::MsSql => "mssql",
        }
    }

    /// Look up a built-in dialect by id.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Default placeholder style.
    pub fn paramstyle(&self) -> ParamStyle {
        match self {
            Self::Generic | Self::PostgreSQL => ParamStyle::Pyformat,
            Self::MySQL => ParamStyle::Format,
            Self::SQLite | Self::MsSql => ParamStyle::Qmark,
            Self::Oracle => ParamStyle::Named,
        }
    }

    /// Characters forbidden on top of the base set.
    pub fn extra_forbidden(&self) -> Vec<char> {
        let specific: &[char] = match self {
            Self::Generic => return Vec::new(),
            Self::PostgreSQL => &['$', ':', '[', ']', '.', '"', '\''],
            Self::MySQL => &[':', '[', ']', '.', '"', '\''],
            Self::SQLite => &[':', '[', ']', '$', '@', '.', '"', '\''],
            Self::Oracle => &[':', '"'],
            Self::MsSql => &['@', ':', '[', ']', '.', '"', '\''],
        };
        specific.iter().chain(WHITESPACE.iter()).copied().collect()
    }

    /// Whether the driver quotes special bind names itself.
    pub fn quotes_bind_names(&self) -> bool {
        matches!(self, Self::Oracle)
    }

    /// Full configuration for this dialect.
    pub fn config(&self) -> DialectConfig {
        DialectConfig::new(self.as_str(), self.paramstyle())
            .with_extra_forbidden(self.extra_forbidden())
            .quotes_bind_names(self.quotes_bind_names())
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a statement builder needs to know about a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectConfig {
    name: SmolStr,
    paramstyle: ParamStyle,
    sanitizer: Sanitizer,
    quotes_bind_names: bool,
    log_renames: bool,
    warn_explicit: bool,
}

impl DialectConfig {
    /// Create a dialect with the base forbidden set.
    pub fn new(name: impl Into<SmolStr>, paramstyle: ParamStyle) -> Self {
        Self {
            name: name.into(),
            paramstyle,
            sanitizer: Sanitizer::default(),
            quotes_bind_names: false,
            log_renames: false,
            warn_explicit: true,
        }
    }

    /// Replace the forbidden set.
    pub fn with_forbidden(mut self, forbidden: ForbiddenChars) -> Self {
        self.sanitizer = Sanitizer::new(forbidden);
        self
    }

    /// Add characters to the forbidden set.
    pub fn with_extra_forbidden(mut self, extra: impl IntoIterator<Item = char>) -> Self {
        let mut forbidden = self.sanitizer.forbidden().clone();
        forbidden.extend(extra);
        self.sanitizer = Sanitizer::new(forbidden);
        self
    }

    /// Change the placeholder style.
    pub fn with_paramstyle(mut self, paramstyle: ParamStyle) -> Self {
        self.paramstyle = paramstyle;
        self
    }

    /// Record whether the driver quotes special bind names.
    pub fn quotes_bind_names(mut self, quotes: bool) -> Self {
        self.quotes_bind_names = quotes;
        self
    }

    /// Log every rewritten anonymous name at debug level.
    pub fn log_renames(mut self, enabled: bool) -> Self {
        self.log_renames = enabled;
        self
    }

    /// Warn about explicit names containing forbidden characters.
    pub fn warn_explicit(mut self, enabled: bool) -> Self {
        self.warn_explicit = enabled;
        self
    }

    /// Dialect id.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder style.
    pub fn paramstyle(&self) -> ParamStyle {
        self.paramstyle
    }

    /// Sanitizer configured with this dialect's forbidden set.
    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    /// Whether the driver quotes special bind names itself.
    pub fn driver_quotes_bind_names(&self) -> bool {
        self.quotes_bind_names
    }

    /// Whether rewritten anonymous names are logged at debug level.
    pub fn logs_renames(&self) -> bool {
        self.log_renames
    }

    /// Whether explicit names with forbidden characters produce a warning.
    pub fn warns_explicit(&self) -> bool {
        self.warn_explicit
    }

    /// Append the placeholder for `name` to `out`.
    ///
    /// `position` is the 1-based number used by [`ParamStyle::Numeric`].
    pub fn write_placeholder(&self, name: &str, position: usize, out: &mut String) {
        match self.paramstyle {
            ParamStyle::Pyformat => {
                out.push_str("%(");
                out.push_str(name);
                out.push_str(")s");
            }
            ParamStyle::Named => {
                out.push(':');
                out.push_str(name);
            }
            ParamStyle::AtNamed => {
                out.push('@');
                out.push_str(name);
            }
            ParamStyle::Numeric => {
                out.push('$');
                out.push_str(&position.to_string());
            }
            ParamStyle::Qmark => out.push('?'),
            ParamStyle::Format => out.push_str("%s"),
        }
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Dialect::PostgreSQL.config()
    }
}

/// Dialect configurations keyed by dialect id.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    dialects: IndexMap<SmolStr, DialectConfig>,
    default: SmolStr,
}

impl DialectRegistry {
    /// A registry holding the built-in dialects, defaulting to PostgreSQL.
    pub fn builtin() -> Self {
        let dialects = Dialect::ALL
            .iter()
            .map(|d| (SmolStr::new(d.as_str()), d.config()))
            .collect();
        Self {
            dialects,
            default: SmolStr::new(Dialect::PostgreSQL.as_str()),
        }
    }

    /// Build a registry from the built-ins plus a `bindsafe.toml` configuration.
    pub fn from_config(config: &BindsafeConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut registry = Self::builtin();

        for (name, settings) in &config.dialects {
            let extra: Vec<char> = settings
                .extra_forbidden
                .as_deref()
                .unwrap_or_default()
                .chars()
                .collect();

            let dialect = match registry.get(name) {
                Some(existing) => {
                    let mut dialect = existing.clone();
                    if settings.replace_builtin {
                        dialect = dialect.with_forbidden(ForbiddenChars::with_extra(extra));
                    } else {
                        dialect = dialect.with_extra_forbidden(extra);
                    }
                    if let Some(style) = settings.paramstyle {
                        dialect = dialect.with_paramstyle(style);
                    }
                    dialect
                }
                None => {
                    let style = settings.paramstyle.ok_or_else(|| {
                        ConfigError::invalid_dialect(name, "custom dialects need a `paramstyle`")
                    })?;
                    DialectConfig::new(name.as_str(), style).with_extra_forbidden(extra)
                }
            };

            let dialect = match settings.quotes_bind_names {
                Some(quotes) => dialect.quotes_bind_names(quotes),
                None => dialect,
            };

            let forbidden: String = dialect.sanitizer().forbidden().iter().collect();
            tracing::debug!(
                dialect = %name,
                paramstyle = ?dialect.paramstyle(),
                forbidden = %forbidden,
                "Configured dialect"
            );
            registry.register(dialect);
        }

        for dialect in registry.dialects.values_mut() {
            *dialect = dialect
                .clone()
                .log_renames(config.debug.log_renames)
                .warn_explicit(config.debug.warn_explicit);
        }

        if let Some(name) = &config.default_dialect {
            if !registry.dialects.contains_key(name.as_str()) {
                return Err(ConfigError::unknown_dialect(name));
            }
            registry.default = SmolStr::new(name);
        }

        Ok(registry)
    }

    /// Load `bindsafe.toml` and build a registry from it.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let config = BindsafeConfig::from_file(path)?;
        Ok(Self::from_config(&config)?)
    }

    /// Look up a dialect.
    pub fn get(&self, name: &str) -> Option<&DialectConfig> {
        self.dialects.get(name)
    }

    /// Look up a dialect, failing with [`ErrorCode::UnknownDialect`](crate::ErrorCode::UnknownDialect).
    pub fn resolve(&self, name: &str) -> QueryResult<&DialectConfig> {
        self.get(name).ok_or_else(|| QueryError::unknown_dialect(name))
    }

    /// Add or replace a dialect. Returns the previous configuration, if any.
    pub fn register(&mut self, dialect: DialectConfig) -> Option<DialectConfig> {
        self.dialects.insert(SmolStr::new(dialect.name()), dialect)
    }

    /// Registered dialect ids in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(SmolStr::as_str)
    }

    /// The default dialect.
    pub fn default_dialect(&self) -> &DialectConfig {
        // `default` is only ever set to a registered id
        &self.dialects[self.default.as_str()]
    }

    /// Change the default dialect.
    pub fn set_default(&mut self, name: &str) -> QueryResult<()> {
        self.resolve(name)?;
        self.default = SmolStr::new(name);
        Ok(())
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

static GLOBAL_REGISTRY: LazyLock<RwLock<DialectRegistry>> =
    LazyLock::new(|| RwLock::new(DialectRegistry::builtin()));

/// Look up a dialect in the process-wide registry.
pub fn global_dialect(name: &str) -> QueryResult<DialectConfig> {
    GLOBAL_REGISTRY.read().resolve(name).cloned()
}

/// The default dialect of the process-wide registry.
pub fn global_default_dialect() -> DialectConfig {
    GLOBAL_REGISTRY.read().default_dialect().clone()
}

/// Add or replace a dialect in the process-wide registry.
pub fn register_global_dialect(dialect: DialectConfig) -> Option<DialectConfig> {
    GLOBAL_REGISTRY.write().register(dialect)
}

/// Replace the process-wide registry, e.g. with one built from `bindsafe.toml`.
pub fn install_global_registry(registry: DialectRegistry) {
    crate::bindsafe_debug!(
        dialects = registry.dialects.len(),
        default = %registry.default,
        "Installing global dialect registry"
    );
    *GLOBAL_REGISTRY.write() = registry;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::BASE_FORBIDDEN;
    use pretty_assertions::assert_eq;

    fn placeholder(config: &DialectConfig, name: &str, position: usize) -> String {
        let mut out = String::new();
        config.write_placeholder(name, position, &mut out);
        out
    }

    #[test]
    fn test_builtin_names_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_name(dialect.as_str()), Some(dialect));
        }
        assert_eq!(Dialect::from_name("db2"), None);
    }

    #[test]
    fn test_every_dialect_keeps_base_set() {
        for dialect in Dialect::ALL {
            let config = dialect.config();
            for c in BASE_FORBIDDEN {
                assert!(config.sanitizer().forbidden().contains(c), "{} lacks {:?}", dialect, c);
            }
        }
    }

    #[test]
    fn test_postgres_strips_driver_tokens() {
        let pg = Dialect::PostgreSQL.config();
        assert_eq!(pg.sanitizer().sanitize_anonymous("tbl.col:x[1]_1"), "tblcolx1_1");
        assert_eq!(pg.sanitizer().sanitize_anonymous("$amount_2"), "amount_2");
        assert!(!pg.driver_quotes_bind_names());
    }

    #[test]
    fn test_oracle_quotes_names() {
        let ora = Dialect::Oracle.config();
        assert!(ora.driver_quotes_bind_names());
        assert_eq!(ora.paramstyle(), ParamStyle::Named);
        // `_` is a legal identifier character but may not lead
        assert_eq!(ora.sanitizer().sanitize_anonymous("_x_1"), "x_1");
    }

    #[test]
    fn test_placeholders() {
        let pg = Dialect::PostgreSQL.config();
        assert_eq!(placeholder(&pg, "name_1", 1), "%(name_1)s");
        assert_eq!(placeholder(&Dialect::Oracle.config(), "name_1", 1), ":name_1");
        assert_eq!(placeholder(&Dialect::SQLite.config(), "name_1", 3), "?");
        assert_eq!(placeholder(&Dialect::MySQL.config(), "name_1", 3), "%s");

        let numeric = DialectConfig::new("pg-numeric", ParamStyle::Numeric);
        assert_eq!(placeholder(&numeric, "name_1", 7), "$7");
        let at = DialectConfig::new("at", ParamStyle::AtNamed);
        assert_eq!(placeholder(&at, "name_1", 1), "@name_1");
    }

    #[test]
    fn test_registry_register_and_resolve() {
        let mut registry = DialectRegistry::builtin();
        assert_eq!(registry.default_dialect().name(), "postgresql");
        assert!(registry.resolve("acme").is_err());

        let acme = DialectConfig::new("acme", ParamStyle::Named).with_extra_forbidden(['#']);
        assert!(registry.register(acme).is_none());
        assert_eq!(
            registry.resolve("acme").unwrap().sanitizer().sanitize_anonymous("a#b_1"),
            "ab_1"
        );

        registry.set_default("acme").unwrap();
        assert_eq!(registry.default_dialect().name(), "acme");
        assert!(registry.set_default("db2").is_err());
        assert_eq!(registry.names().last(), Some("acme"));
    }

    #[test]
    fn test_registry_from_config() {
        let config = BindsafeConfig::from_str(
            r##"
            default_dialect = "acme"

            [dialects.postgresql]
            extra_forbidden = "#"

            [dialects.sqlite]
            extra_forbidden = "!"
            replace_builtin = true
            paramstyle = "named"

            [dialects.acme]
            paramstyle = "at_named"
            quotes_bind_names = true

            [debug]
            log_renames = true
            "##,
        )
        .unwrap();

        let registry = DialectRegistry::from_config(&config).unwrap();
        assert_eq!(registry.default_dialect().name(), "acme");

        let pg = registry.get("postgresql").unwrap();
        assert!(pg.sanitizer().forbidden().contains('#'));
        assert!(pg.sanitizer().forbidden().contains('$'));
        assert!(pg.logs_renames());

        let sqlite = registry.get("sqlite").unwrap();
        assert_eq!(sqlite.paramstyle(), ParamStyle::Named);
        assert_eq!(sqlite.sanitizer().forbidden().extras().collect::<String>(), "!");

        let acme = registry.get("acme").unwrap();
        assert_eq!(acme.paramstyle(), ParamStyle::AtNamed);
        assert!(acme.driver_quotes_bind_names());
    }

    #[test]
    fn test_custom_dialect_needs_paramstyle() {
        let config = BindsafeConfig::from_str(
            r##"
            [dialects.acme]
            extra_forbidden = "#"
            "##,
        )
        .unwrap();

        let err = DialectRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDialect { .. }));
    }

    #[test]
    fn test_unknown_default_dialect() {
        let config = BindsafeConfig::from_str(r#"default_dialect = "db2""#).unwrap();
        let err = DialectRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDialect { .. }));
    }

    #[test]
    fn test_global_registry() {
        register_global_dialect(
            DialectConfig::new("global-test", ParamStyle::Named).with_extra_forbidden(['~']),
        );
        let dialect = global_dialect("global-test").unwrap();
        assert!(dialect.sanitizer().forbidden().contains('~'));
        assert!(global_dialect("never-registered").is_err());
    }
}
