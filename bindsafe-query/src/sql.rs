//! Statement building with bound parameters.
//!
//! [`SqlBuilder`] collects literal SQL and bind parameters, then renders
//! them for one dialect. Whatever name ends up in a placeholder is also the
//! key of that value in [`CompiledStatement::params`].
//!
//! ```rust
//! use bindsafe_query::sql::SqlBuilder;
//!
//! let mut builder = SqlBuilder::postgres();
//! builder
//!     .push("SELECT * FROM ")
//!     .push_identifier("order")
//!     .push(" WHERE ")
//!     .push_identifier("My Column (2)")
//!     .push(" = ")
//!     .push_column_bind("My Column (2)", 42);
//!
//! let stmt = builder.build().unwrap();
//! assert_eq!(
//!     stmt.sql(),
//!     r#"SELECT * FROM "order" WHERE "My Column (2)" = %(MyColumn2_1)s"#
//! );
//! assert!(stmt.params().contains_key("MyColumn2_1"));
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::bind::{Anonymizer, BindName};
use crate::dialect::{self, Dialect, DialectConfig, ParamStyle};
use crate::error::{QueryError, QueryResult};
use crate::value::BindValue;

/// Words that always need quoting when used as identifiers.
const RESERVED: &[&str] = &[
    "all", "and", "as", "between", "by", "case", "check", "column", "create", "default",
    "delete", "distinct", "drop", "else", "end", "from", "group", "having", "in", "index",
    "insert", "into", "is", "join", "key", "like", "limit", "not", "null", "offset", "on",
    "or", "order", "select", "set", "table", "then", "union", "update", "user", "values",
    "when", "where",
];

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    !starts_ok
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        || RESERVED.contains(&name.to_ascii_lowercase().as_str())
}

/// Opening and closing identifier quote for a dialect.
fn identifier_quotes(dialect: &DialectConfig) -> (char, char) {
    match Dialect::from_name(dialect.name()) {
        Some(Dialect::MySQL) => ('`', '`'),
        Some(Dialect::MsSql) => ('[', ']'),
        _ => ('"', '"'),
    }
}

/// Quote an identifier for `dialect` if needed, doubling embedded close quotes.
pub fn quote_identifier(dialect: &DialectConfig, name: &str) -> String {
    if !needs_quoting(name) {
        return name.to_string();
    }
    let (open, close) = identifier_quotes(dialect);
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(open);
    for c in name.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Bind(SmolStr),
}

#[derive(Debug, Clone)]
struct BoundParam {
    value: BindValue,
    anonymous: bool,
}

/// A SQL builder for one statement.
///
/// Methods chain on `&mut Self`. The first bind error is kept and returned
/// by [`build`](Self::build); later pushes are ignored.
#[derive(Debug)]
pub struct SqlBuilder {
    dialect: DialectConfig,
    segments: Vec<Segment>,
    params: IndexMap<SmolStr, BoundParam>,
    anonymizer: Anonymizer,
    error: Option<QueryError>,
}

impl SqlBuilder {
    /// Create a SQL builder for a dialect.
    pub fn new(dialect: DialectConfig) -> Self {
        Self {
            dialect,
            segments: Vec::new(),
            params: IndexMap::new(),
            anonymizer: Anonymizer::new(),
            error: None,
        }
    }

    /// Create a builder for a dialect registered in the global registry.
    pub fn for_dialect(name: &str) -> QueryResult<Self> {
        dialect::global_dialect(name).map(Self::new)
    }

    /// Create a PostgreSQL SQL builder.
    pub fn postgres() -> Self {
        Self::new(Dialect::PostgreSQL.config())
    }

    /// Create a MySQL SQL builder.
    pub fn mysql() -> Self {
        Self::new(Dialect::MySQL.config())
    }

    /// Create a SQLite SQL builder.
    pub fn sqlite() -> Self {
        Self::new(Dialect::SQLite.config())
    }

    /// Create an Oracle SQL builder.
    pub fn oracle() -> Self {
        Self::new(Dialect::Oracle.config())
    }

    /// Create a SQL Server builder.
    pub fn mssql() -> Self {
        Self::new(Dialect::MsSql.config())
    }

    /// The dialect this builder renders for.
    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    /// Push a literal SQL string.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.segments.push(Segment::Text(sql.as_ref().to_string()));
        self
    }

    /// Push an identifier (properly quoted if needed).
    pub fn push_identifier(&mut self, name: &str) -> &mut Self {
        let quoted = quote_identifier(&self.dialect, name);
        self.segments.push(Segment::Text(quoted));
        self
    }

    /// Push a separator between parts.
    pub fn push_sep(&mut self, sep: &str) -> &mut Self {
        self.push(sep)
    }

    /// Push a bind parameter under the given name.
    ///
    /// Anonymous names are sanitized for this dialect; explicit names are
    /// used verbatim.
    pub fn push_bind(&mut self, name: BindName, value: impl Into<BindValue>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        match self.register(&name, value.into()) {
            Ok(key) => self.segments.push(Segment::Bind(key)),
            Err(err) => {
                let sql = self.sql();
                self.error = Some(
                    err.with_context("Binding parameter")
                        .with_dialect(self.dialect.name())
                        .with_sql(sql),
                );
            }
        }
        self
    }

    /// Push an anonymous bind parameter named after `column`.
    pub fn push_column_bind(&mut self, column: &str, value: impl Into<BindValue>) -> &mut Self {
        let name = self.anonymizer.next_for(column);
        self.push_bind(name, value)
    }

    /// Push an anonymous bind parameter with no column to name it after.
    pub fn push_param(&mut self, value: impl Into<BindValue>) -> &mut Self {
        let name = self.anonymizer.next_param();
        self.push_bind(name, value)
    }

    /// Number of distinct parameters bound so far.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The SQL rendered so far (without consuming).
    pub fn sql(&self) -> String {
        self.render().0
    }

    fn register(&mut self, name: &BindName, value: BindValue) -> QueryResult<SmolStr> {
        let sanitizer = self.dialect.sanitizer();
        let key = name.sanitized(sanitizer);

        if name.is_anonymous() {
            if key != name.as_str() {
                if self.dialect.logs_renames() {
                    tracing::debug!(
                        original = name.as_str(),
                        sanitized = %key,
                        dialect = self.dialect.name(),
                        "Sanitized anonymous bind name"
                    );
                } else {
                    crate::bindsafe_trace!(
                        original = name.as_str(),
                        sanitized = %key,
                        "Sanitized anonymous bind name"
                    );
                }
            }
            if key.is_empty() {
                return Err(QueryError::invalid_parameter(
                    name.as_str(),
                    "nothing is left after sanitization",
                ));
            }
            if self.params.contains_key(&*key) {
                return Err(QueryError::bind_collision(&*key));
            }

            let key = SmolStr::new(key);
            self.params.insert(
                key.clone(),
                BoundParam {
                    value,
                    anonymous: true,
                },
            );
            return Ok(key);
        }

        if key.is_empty() {
            return Err(QueryError::invalid_parameter("", "explicit bind names cannot be empty"));
        }
        if self.dialect.warns_explicit() {
            let offending = sanitizer.offending_chars(&key);
            if !offending.is_empty() {
                tracing::warn!(
                    bind = %key,
                    dialect = self.dialect.name(),
                    characters = ?offending,
                    "Explicit bind name contains characters the dialect's placeholder syntax may not accept"
                );
            }
        }

        let key = SmolStr::new(key);
        if let Some(existing) = self.params.get(&key) {
            return if existing.anonymous {
                Err(QueryError::explicit_collision(key.as_str()))
            } else if existing.value == value {
                Ok(key)
            } else {
                Err(QueryError::duplicate_bind(key.as_str()))
            };
        }

        self.params.insert(
            key.clone(),
            BoundParam {
                value,
                anonymous: false,
            },
        );
        Ok(key)
    }

    /// Render segments; returns the SQL and the name behind each positional marker.
    fn render(&self) -> (String, Vec<SmolStr>) {
        let style = self.dialect.paramstyle();
        let mut sql = String::new();
        let mut markers = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) if style.escapes_percent() => {
                    sql.push_str(&text.replace('%', "%%"));
                }
                Segment::Text(text) => sql.push_str(text),
                Segment::Bind(name) => {
                    // params are registered on first use, so index order is first-appearance order
                    let position = self.params.get_index_of(name).map_or(0, |i| i + 1);
                    self.dialect.write_placeholder(name, position, &mut sql);
                    markers.push(name.clone());
                }
            }
        }

        (sql, markers)
    }

    /// Build the final statement.
    pub fn build(mut self) -> QueryResult<CompiledStatement> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let style = self.dialect.paramstyle();
        let (sql, markers) = self.render();

        let positions: Vec<String> = match style {
            ParamStyle::Qmark | ParamStyle::Format => {
                markers.iter().map(|m| m.to_string()).collect()
            }
            _ => self.params.keys().map(|k| k.to_string()).collect(),
        };

        let params: IndexMap<String, BindValue> = self
            .params
            .into_iter()
            .map(|(k, p)| (k.to_string(), p.value))
            .collect();

        tracing::debug!(
            dialect = self.dialect.name(),
            paramstyle = ?style,
            params = params.len(),
            markers = markers.len(),
            "Built statement"
        );

        Ok(CompiledStatement {
            sql,
            params,
            positions,
            paramstyle: style,
            dialect: SmolStr::new(self.dialect.name()),
        })
    }
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::new(dialect::global_default_dialect())
    }
}

/// SQL text plus its parameter mapping, ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    sql: String,
    params: IndexMap<String, BindValue>,
    positions: Vec<String>,
    paramstyle: ParamStyle,
    dialect: SmolStr,
}

impl CompiledStatement {
    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters keyed by the exact name used in the SQL text.
    pub fn params(&self) -> &IndexMap<String, BindValue> {
        &self.params
    }

    /// Alias of [`params`](Self::params) for named paramstyles.
    pub fn named_params(&self) -> &IndexMap<String, BindValue> {
        &self.params
    }

    /// Names in positional order.
    ///
    /// For `?` and `%s` one entry per marker (a reused name repeats); for
    /// every other style one entry per distinct name, in first-appearance
    /// order, which is also the `$n` numbering.
    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Values in positional order, following [`positions`](Self::positions).
    pub fn positional_params(&self) -> Vec<&BindValue> {
        self.positions
            .iter()
            .filter_map(|name| self.params.get(name))
            .collect()
    }

    /// The paramstyle used for rendering.
    pub fn paramstyle(&self) -> ParamStyle {
        self.paramstyle
    }

    /// The dialect id used for rendering.
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Consume into SQL and parameters.
    pub fn into_parts(self) -> (String, IndexMap<String, BindValue>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sanitize::Sanitizer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_needs_quoting() {
        assert!(needs_quoting("user"));
        assert!(needs_quoting("ORDER"));
        assert!(needs_quoting("has space"));
        assert!(needs_quoting("1st"));
        assert!(needs_quoting(""));
        assert!(!needs_quoting("my_table"));
        assert!(!needs_quoting("users"));
    }

    #[test]
    fn test_quote_identifier_per_dialect() {
        let pg = Dialect::PostgreSQL.config();
        assert_eq!(quote_identifier(&pg, "user"), "\"user\"");
        assert_eq!(quote_identifier(&pg, "has\"quote"), "\"has\"\"quote\"");
        assert_eq!(quote_identifier(&pg, "my_table"), "my_table");
        assert_eq!(quote_identifier(&Dialect::MySQL.config(), "my col"), "`my col`");
        assert_eq!(quote_identifier(&Dialect::MsSql.config(), "a]b"), "[a]]b]");
    }

    #[test]
    fn test_pyformat_statement() {
        let mut builder = SqlBuilder::postgres();
        builder
            .push("SELECT * FROM t WHERE ")
            .push_identifier("My Column (2)")
            .push(" = ")
            .push_column_bind("My Column (2)", 1)
            .push(" AND rate LIKE '10%' AND id = ")
            .push_bind(BindName::explicit("id"), 7);

        let stmt = builder.build().unwrap();
        insta::assert_snapshot!(
            stmt.sql(),
            @r#"SELECT * FROM t WHERE "My Column (2)" = %(MyColumn2_1)s AND rate LIKE '10%%' AND id = %(id)s"#
        );
        assert_eq!(
            stmt.params().keys().collect::<Vec<_>>(),
            vec!["MyColumn2_1", "id"]
        );
        assert_eq!(stmt.dialect(), "postgresql");
    }

    #[test]
    fn test_named_style_leaves_percent_alone() {
        let mut builder = SqlBuilder::oracle();
        builder
            .push("SELECT 1 FROM dual WHERE x LIKE '5%' AND y = ")
            .push_column_bind("_y", "a");

        let stmt = builder.build().unwrap();
        assert_eq!(stmt.sql(), "SELECT 1 FROM dual WHERE x LIKE '5%' AND y = :y_1");
        assert_eq!(stmt.params()["y_1"], BindValue::from("a"));
    }

    #[test]
    fn test_qmark_positions_repeat_reused_names() {
        let mut builder = SqlBuilder::sqlite();
        builder
            .push("SELECT * FROM t WHERE a = ")
            .push_bind("k".into(), 1)
            .push(" OR b = ")
            .push_column_bind("b", 2)
            .push(" OR c = ")
            .push_bind("k".into(), 1);

        let stmt = builder.build().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = ? OR b = ? OR c = ?");
        assert_eq!(stmt.positions(), ["k", "b_1", "k"]);
        assert_eq!(
            stmt.positional_params(),
            vec![&BindValue::Int(1), &BindValue::Int(2), &BindValue::Int(1)]
        );
        assert_eq!(stmt.params().len(), 2);
    }

    #[test]
    fn test_numeric_reuses_numbers() {
        let numeric = DialectConfig::new("pg-numeric", ParamStyle::Numeric);
        let mut builder = SqlBuilder::new(numeric);
        builder
            .push("a = ")
            .push_bind("k".into(), 1)
            .push(" AND b = ")
            .push_param(2)
            .push(" AND c = ")
            .push_bind("k".into(), 1);

        let stmt = builder.build().unwrap();
        assert_eq!(stmt.sql(), "a = $1 AND b = $2 AND c = $1");
        assert_eq!(stmt.positions(), ["k", "param_1"]);
    }

    #[test]
    fn test_format_style_escapes_percent() {
        let mut builder = SqlBuilder::mysql();
        builder.push("SELECT '100%' WHERE x = ").push_param(1);

        let stmt = builder.build().unwrap();
        assert_eq!(stmt.sql(), "SELECT '100%%' WHERE x = %s");
        assert_eq!(stmt.positions(), ["param_1"]);
    }

    #[test]
    fn test_explicit_name_passes_through() {
        let mut builder = SqlBuilder::postgres();
        builder.push("x = ").push_bind(BindName::explicit("_My Key"), 1);

        let stmt = builder.build().unwrap();
        assert_eq!(stmt.sql(), "x = %(_My Key)s");
        assert!(stmt.params().contains_key("_My Key"));
    }

    #[test]
    fn test_anonymous_collides_with_explicit() {
        let mut builder = SqlBuilder::postgres();
        builder
            .push_bind("name_1".into(), "explicit")
            .push_column_bind("(name)", "anonymous");

        let err = builder.build().unwrap_err();
        assert_eq!(err.code, ErrorCode::BindNameCollision);
        assert_eq!(err.context.bind.as_deref(), Some("name_1"));
        assert_eq!(err.context.dialect.as_deref(), Some("postgresql"));
    }

    #[test]
    fn test_explicit_collides_with_anonymous() {
        let mut builder = SqlBuilder::postgres();
        builder
            .push_column_bind("name", 1)
            .push_bind("name_1".into(), 1);

        let err = builder.build().unwrap_err();
        assert_eq!(err.code, ErrorCode::BindNameCollision);
        assert!(err.message.starts_with("Explicit bind `name_1`"), "{}", err.message);
    }

    #[test]
    fn test_explicit_reuse_with_other_value() {
        let mut builder = SqlBuilder::postgres();
        builder.push_bind("k".into(), 1).push_bind("k".into(), 2);

        let err = builder.build().unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateBind);
    }

    #[test]
    fn test_first_error_wins() {
        let mut builder = SqlBuilder::postgres();
        builder
            .push_bind("k".into(), 1)
            .push_bind("k".into(), 2)
            .push_bind(BindName::explicit(""), 3);

        assert_eq!(builder.build().unwrap_err().code, ErrorCode::DuplicateBind);
    }

    #[test]
    fn test_empty_anonymous_name_rejected() {
        let mut builder = SqlBuilder::postgres();
        builder.push_bind(BindName::anonymous("% ()"), 1);

        let err = builder.build().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_placeholder_names_match_param_keys() {
        let columns = ["My Column (2)", "_id", "100%", "a b c", "(x)"];
        let mut builder = SqlBuilder::postgres();
        for (i, column) in columns.iter().enumerate() {
            builder.push(" ").push_column_bind(column, i as i64);
        }

        let stmt = builder.build().unwrap();
        for key in stmt.params().keys() {
            assert!(stmt.sql().contains(&format!("%({})s", key)), "{} missing", key);
            assert!(Sanitizer::default().is_clean(key));
        }
        assert_eq!(stmt.params().len(), columns.len());
    }

    #[test]
    fn test_for_dialect() {
        assert!(SqlBuilder::for_dialect("oracle").is_ok());
        let err = SqlBuilder::for_dialect("db2").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownDialect);
    }

    #[test]
    fn test_into_parts() {
        let mut builder = SqlBuilder::postgres();
        builder.push("SELECT ").push_param(true);

        let (sql, params) = builder.build().unwrap().into_parts();
        assert_eq!(sql, "SELECT %(param_1)s");
        assert_eq!(params["param_1"], BindValue::Bool(true));
    }
}
