//! Configuration file parsing for `bindsafe.toml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ConfigError, ConfigResult};

/// Placeholder syntax understood by a database driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// `%(name)s`
    Pyformat,
    /// `:name`
    Named,
    /// `@name`
    AtNamed,
    /// `$1`, `$2`, ...
    Numeric,
    /// `?`
    Qmark,
    /// `%s`
    Format,
}

impl ParamStyle {
    /// Whether literal `%` in statement text must be doubled.
    pub fn escapes_percent(&self) -> bool {
        matches!(self, Self::Pyformat | Self::Format)
    }
}

/// Main configuration structure for `bindsafe.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BindsafeConfig {
    /// Dialect used when none is given explicitly.
    #[serde(default)]
    pub default_dialect: Option<String>,

    /// Per-dialect overrides and custom dialects, keyed by dialect id.
    #[serde(default)]
    pub dialects: IndexMap<String, DialectSettings>,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl BindsafeConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self =
            toml::from_str(&expanded).map_err(|e| ConfigError::TomlError { source: e })?;
        config.validate()?;

        tracing::debug!(
            dialects = config.dialects.len(),
            default_dialect = ?config.default_dialect,
            "Loaded bindsafe configuration"
        );

        Ok(config)
    }

    /// Check dialect names and forbidden sets. Whether `default_dialect` exists
    /// is decided by the registry that consumes this config, since built-ins are
    /// not listed here.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, settings) in &self.dialects {
            validate_dialect_name(name)?;
            if let Some(extra) = &settings.extra_forbidden {
                validate_extra_forbidden(name, extra)?;
            }
        }
        if let Some(name) = &self.default_dialect {
            validate_dialect_name(name)?;
        }
        Ok(())
    }

    /// Settings for one dialect, if configured.
    pub fn dialect(&self, name: &str) -> Option<&DialectSettings> {
        self.dialects.get(name)
    }
}

/// Generated names end in `_{n}` and must keep their leading digits, so
/// neither `_` nor ASCII letters and digits may be forbidden.
fn validate_extra_forbidden(name: &str, extra: &str) -> ConfigResult<()> {
    if let Some(c) = extra
        .chars()
        .find(|c| *c == '_' || c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::invalid_dialect(
            name,
            format!("extra_forbidden may not contain {:?}", c),
        ));
    }
    Ok(())
}

fn validate_dialect_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::invalid_dialect(name, "name is empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(ConfigError::invalid_dialect(
            name,
            format!("unexpected character {:?}", c),
        ));
    }
    Ok(())
}

/// Settings for a single dialect.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialectSettings {
    /// Placeholder style. Required for dialects that are not built in.
    #[serde(default)]
    pub paramstyle: Option<ParamStyle>,

    /// Characters removed from anonymous bind names on top of `% ( )` and space.
    #[serde(default)]
    pub extra_forbidden: Option<String>,

    /// Replace the built-in extra characters instead of adding to them.
    #[serde(default)]
    pub replace_builtin: bool,

    /// Whether the driver quotes special bind names on its own.
    #[serde(default)]
    pub quotes_bind_names: Option<bool>,
}

/// Debug/logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every anonymous bind name that sanitization rewrites.
    #[serde(default)]
    pub log_renames: bool,

    /// Warn when an explicit bind name contains characters the dialect forbids.
    #[serde(default = "default_true")]
    pub warn_explicit: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_renames: false,
            warn_explicit: true,
        }
    }
}

fn default_true() -> bool {
    true
}

static ENV_VAR: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Expand `${VAR}` references. Unset variables are left untouched.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}
