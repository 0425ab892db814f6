//! Sanitization of anonymous bind parameter names.
//!
//! Anonymous bind names are derived from column names, which may contain
//! anything. Before such a name is rendered into a placeholder it has to be
//! safe for two parsers at once:
//!
//! - `%(name)s` style assembly, where `%`, `(` and `)` would be read as
//!   format syntax;
//! - the driver's own placeholder grammar, where a space (or another
//!   delimiter) ends the token early.
//!
//! Sanitizing an anonymous name removes every forbidden character and then
//! strips leading underscores. Leading digits are kept: generated names such
//! as `1_2` must stay distinct. Explicit names, chosen by the caller, are
//! returned untouched.
//!
//! ```rust
//! use bindsafe_query::sanitize::sanitize;
//!
//! assert_eq!(sanitize("My Column (2)_1", true), "MyColumn2_1");
//! assert_eq!(sanitize("_123", true), "123");
//! assert_eq!(sanitize("My Column (2)", false), "My Column (2)");
//! ```

use smallvec::SmallVec;
use std::borrow::Cow;

/// Characters removed from every anonymous name, whatever the dialect.
pub const BASE_FORBIDDEN: [char; 4] = ['%', '(', ')', ' '];

/// A set of characters that may not appear in an anonymous bind name.
///
/// Always contains [`BASE_FORBIDDEN`]. Kept sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForbiddenChars {
    chars: SmallVec<[char; 16]>,
}

impl ForbiddenChars {
    /// The base set only.
    pub fn base() -> Self {
        let mut chars: SmallVec<[char; 16]> = SmallVec::from_slice(&BASE_FORBIDDEN);
        chars.sort_unstable();
        Self { chars }
    }

    /// The base set plus `extra`.
    pub fn with_extra(extra: impl IntoIterator<Item = char>) -> Self {
        let mut set = Self::base();
        set.extend(extra);
        set
    }

    /// Add characters to the set.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = char>) {
        for c in extra {
            if let Err(pos) = self.chars.binary_search(&c) {
                self.chars.insert(pos, c);
            }
        }
    }

    /// Check whether `c` is forbidden.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.chars.binary_search(&c).is_ok()
    }

    /// Iterate over all forbidden characters in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// The characters beyond [`BASE_FORBIDDEN`].
    pub fn extras(&self) -> impl Iterator<Item = char> + '_ {
        self.iter().filter(|c| !BASE_FORBIDDEN.contains(c))
    }

    /// Number of forbidden characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Never true: the base set is always present.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for ForbiddenChars {
    fn default() -> Self {
        Self::base()
    }
}

/// Sanitizes bind names against a forbidden character set.
///
/// Stateless apart from its configuration; share it freely between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitizer {
    forbidden: ForbiddenChars,
}

impl Sanitizer {
    /// Create a sanitizer for the given set.
    pub fn new(forbidden: ForbiddenChars) -> Self {
        Self { forbidden }
    }

    /// The forbidden set in use.
    pub fn forbidden(&self) -> &ForbiddenChars {
        &self.forbidden
    }

    /// Sanitize `name` if it is anonymous, otherwise return it unchanged.
    pub fn sanitize<'a>(&self, name: &'a str, is_anonymous: bool) -> Cow<'a, str> {
        if is_anonymous {
            self.sanitize_anonymous(name)
        } else {
            Cow::Borrowed(name)
        }
    }

    /// Remove forbidden characters, then strip leading underscores.
    ///
    /// The order matters for idempotence: `" _a"` must become `"a"` in one
    /// pass, not `"_a"`.
    pub fn sanitize_anonymous<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if !name.chars().any(|c| self.forbidden.contains(c)) {
            return Cow::Borrowed(name.trim_start_matches('_'));
        }

        let mut cleaned: String = name
            .chars()
            .filter(|c| !self.forbidden.contains(*c))
            .collect();

        let leading = cleaned.len() - cleaned.trim_start_matches('_').len();
        cleaned.replace_range(..leading, "");
        Cow::Owned(cleaned)
    }

    /// Check whether `name` would pass through anonymous sanitization unchanged.
    pub fn is_clean(&self, name: &str) -> bool {
        !name.starts_with('_') && !name.chars().any(|c| self.forbidden.contains(c))
    }

    /// Forbidden characters present in `name`, in order of first appearance.
    pub fn offending_chars(&self, name: &str) -> Vec<char> {
        let mut found = Vec::new();
        for c in name.chars() {
            if self.forbidden.contains(c) && !found.contains(&c) {
                found.push(c);
            }
        }
        found
    }
}

/// Sanitize with the base forbidden set.
///
/// `is_anonymous == false` always returns `name` unchanged.
pub fn sanitize(name: &str, is_anonymous: bool) -> Cow<'_, str> {
    Sanitizer::default().sanitize(name, is_anonymous)
}
