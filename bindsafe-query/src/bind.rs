//! Bind names tagged with their provenance.
//!
//! A bind name is either chosen by the caller ([`BindName::Explicit`]) or
//! generated from a column name ([`BindName::Anonymous`]). Only anonymous
//! names are ever sanitized; the tag travels with the name so that nothing
//! downstream has to guess from the spelling.

use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;

use crate::sanitize::Sanitizer;

/// Seed used when an anonymous bind has no column to derive its name from.
pub const DEFAULT_SEED: &str = "param";

/// A bind parameter name and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindName {
    /// Generated internally; sanitized before use.
    Anonymous(SmolStr),
    /// Supplied by the caller; used verbatim.
    Explicit(SmolStr),
}

impl BindName {
    /// Create an anonymous name.
    pub fn anonymous(name: impl Into<SmolStr>) -> Self {
        Self::Anonymous(name.into())
    }

    /// Create an explicit name.
    pub fn explicit(name: impl Into<SmolStr>) -> Self {
        Self::Explicit(name.into())
    }

    /// Whether this name was generated internally.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }

    /// The name as generated or supplied, before sanitization.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anonymous(name) | Self::Explicit(name) => name.as_str(),
        }
    }

    /// The name to render: sanitized if anonymous, verbatim if explicit.
    pub fn sanitized(&self, sanitizer: &Sanitizer) -> Cow<'_, str> {
        sanitizer.sanitize(self.as_str(), self.is_anonymous())
    }
}

impl fmt::Display for BindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-supplied key is explicit.
impl From<&str> for BindName {
    fn from(name: &str) -> Self {
        Self::explicit(name)
    }
}

impl From<String> for BindName {
    fn from(name: String) -> Self {
        Self::explicit(name)
    }
}

/// Generates anonymous names for one statement.
///
/// Names are `{identifier}_{n}` with `n` counting from 1. The suffix is
/// unique per anonymizer, which keeps two generated names distinct even
/// after sanitization as long as the forbidden set leaves `_` and ASCII
/// digits alone. Config validation refuses sets that don't.
#[derive(Debug, Default)]
pub struct Anonymizer {
    counter: usize,
}

impl Anonymizer {
    /// Create a fresh anonymizer.
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Next anonymous name derived from `identifier`.
    ///
    /// An empty identifier falls back to [`DEFAULT_SEED`].
    pub fn next_for(&mut self, identifier: &str) -> BindName {
        self.counter += 1;
        let seed = if identifier.is_empty() {
            DEFAULT_SEED
        } else {
            identifier
        };
        BindName::Anonymous(SmolStr::new(format!("{}_{}", seed, self.counter)))
    }

    /// Next anonymous name with no identifier to derive from.
    pub fn next_param(&mut self) -> BindName {
        self.next_for(DEFAULT_SEED)
    }

    /// Number of names generated so far.
    pub fn generated(&self) -> usize {
        self.counter
    }
}
