//! Integration tests for bind name sanitization.
//!
//! These tests check the sanitizer's contract over a broad set of names:
//! - Explicit names are never altered
//! - Anonymous names lose `%`, `(`, `)`, spaces and leading underscores
//! - Leading digits survive
//! - Sanitizing twice changes nothing

use bindsafe::query::{Anonymizer, BASE_FORBIDDEN, Dialect, Sanitizer};
use bindsafe::sanitize;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Names a column could plausibly carry, plus some hostile ones.
fn corpus() -> Vec<String> {
    let mut names: Vec<String> = [
        "",
        "_",
        "id",
        "_id",
        "__private",
        "_123",
        "123_456",
        "007",
        "My Column (2)",
        "My Column (2)_1",
        "percent %",
        "%(name)s",
        "a  b",
        " leading space",
        "trailing space ",
        "(_)",
        "__(__)__",
        "größe (m²)",
        "Tab\tSeparated",
        "tbl.col",
        "[bracketed]",
        ":colon",
        "$dollar",
        "@at",
        "\"quoted\"",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // every pairing of a hostile prefix with a plain body
    for prefix in ["_", " ", "%", "(", ")", "_ (", "9"] {
        for body in ["x", "_x", "1", "x y"] {
            names.push(format!("{}{}", prefix, body));
        }
    }
    names
}

/// Explicit names pass through unchanged regardless of content.
#[test]
fn test_explicit_names_unchanged() {
    for name in corpus() {
        assert_eq!(sanitize(&name, false), name.as_str());
    }
}

/// No base-forbidden character survives, for any dialect.
#[test]
fn test_no_forbidden_characters() {
    for dialect in Dialect::ALL {
        let config = dialect.config();
        let sanitizer = config.sanitizer();
        for name in corpus() {
            let out = sanitizer.sanitize_anonymous(&name);
            for c in BASE_FORBIDDEN {
                assert!(!out.contains(c), "{}: {:?} -> {:?}", dialect, name, out);
            }
            for c in sanitizer.forbidden().iter() {
                assert!(!out.contains(c), "{}: {:?} -> {:?}", dialect, name, out);
            }
        }
    }
}

/// Results never start with an underscore.
#[test]
fn test_no_leading_underscore() {
    for name in corpus() {
        let out = sanitize(&name, true);
        assert!(!out.starts_with('_'), "{:?} -> {:?}", name, out);
    }
}

/// Numeric names keep their leading digits.
#[test]
fn test_numeric_names() {
    assert_eq!(sanitize("_123", true), "123");
    assert_eq!(sanitize("123_456", true), "123_456");
    assert_eq!(sanitize("007", true), "007");
}

/// Sanitizing a sanitized name is a no-op.
#[test]
fn test_idempotence() {
    for dialect in Dialect::ALL {
        let config = dialect.config();
        let sanitizer = config.sanitizer();
        for name in corpus() {
            let once = sanitizer.sanitize_anonymous(&name).into_owned();
            assert_eq!(sanitizer.sanitize_anonymous(&once), once.as_str());
            assert!(sanitizer.is_clean(&once) || once.is_empty());
        }
    }
}

/// Surviving characters keep their order and case.
#[test]
fn test_order_preserved() {
    let sanitizer = Sanitizer::default();
    for name in corpus() {
        let out = sanitizer.sanitize_anonymous(&name);
        let expected: String = name.chars().filter(|c| !BASE_FORBIDDEN.contains(c)).collect();
        assert_eq!(out, expected.trim_start_matches('_'));
    }
}

/// The worked example from the changelog.
#[test]
fn test_column_with_spaces_and_parentheses() {
    assert_eq!(sanitize("My Column (2)_1", true), "MyColumn2_1");
}

/// Names produced by one anonymizer never collide after sanitization.
#[test]
fn test_generated_names_do_not_collide() {
    for dialect in Dialect::ALL {
        let config = dialect.config();
        let mut anonymizer = Anonymizer::new();
        let mut seen = HashSet::new();

        // the same hostile column twice, plus columns that differ only in stripped characters
        let mut columns = corpus();
        columns.extend(corpus());
        columns.extend(["ab", "a b", "a(b)", "_ab", "a%b"].map(String::from));

        for column in &columns {
            let name = anonymizer.next_for(column);
            let sanitized = name.sanitized(config.sanitizer()).into_owned();
            assert!(!sanitized.is_empty(), "{}: {:?} sanitized to nothing", dialect, column);
            assert!(
                seen.insert(sanitized.clone()),
                "{}: {:?} collided as {:?}",
                dialect,
                column,
                sanitized
            );
        }
    }
}
