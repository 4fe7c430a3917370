//! SELECT statement model
//!
//! In-memory representation of a query: data sources, optional column list,
//! optional limit/offset. Statements render themselves to InfluxQL text;
//! the rendered text is the only wire contract this module defines.
//!
//! # Example
//!
//! ```rust
//! use influxq::{DataSource, Statement};
//!
//! let stmt = Statement::select(vec![DataSource::measurement("cpu")])
//!     .unwrap()
//!     .with_limit(10)
//!     .with_offset(5);
//! assert_eq!(stmt.render(), "SELECT * FROM \"cpu\" LIMIT 10 OFFSET 5");
//! ```

use crate::error::{ClientError, ClientResult};
use crate::quote::{quote, quote_always};

/// A fully- or partially-qualified source a query reads from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSource {
    /// Database name
    pub database: Option<String>,
    /// Retention policy name
    pub retention_policy: Option<String>,
    /// Measurement name
    pub measurement: Option<String>,
}

impl DataSource {
    /// Create a source naming only a measurement
    pub fn measurement(name: impl Into<String>) -> Self {
        Self {
            measurement: Some(name.into()),
            ..Self::default()
        }
    }

    /// Qualify the source with a database
    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    /// Qualify the source with a retention policy
    pub fn with_retention_policy(mut self, name: impl Into<String>) -> Self {
        self.retention_policy = Some(name.into());
        self
    }

    /// True when no segment is set; such a source renders to nothing
    pub fn is_empty(&self) -> bool {
        self.database.is_none() && self.retention_policy.is_none() && self.measurement.is_none()
    }

    /// Render the dotted source path.
    ///
    /// Segments appear in the fixed order database, retention policy,
    /// measurement, each quoted and escaped, joined with `.`. Source
    /// segments are always quoted so a path reads the same whether or not
    /// a name happens to be bare. An absent database before a present
    /// retention policy renders as the `""` placeholder so the positional
    /// meaning of the path survives.
    pub fn render(&self) -> String {
        let mut segments = Vec::with_capacity(3);
        if self.database.is_some() || self.retention_policy.is_some() {
            segments.push(quote_always(self.database.as_deref().unwrap_or_default()));
        }
        if let Some(rp) = &self.retention_policy {
            segments.push(quote_always(rp));
        }
        if let Some(m) = &self.measurement {
            segments.push(quote_always(m));
        }
        segments.join(".")
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A composable SELECT statement
///
/// Built once with [`Statement::select`], then refined through the
/// consuming `with_*` methods. Each call returns the statement by value so
/// chains never alias mutable sub-state:
///
/// ```rust
/// # use influxq::{DataSource, Statement};
/// let stmt = Statement::select(vec![DataSource::measurement("cpu")])
///     .unwrap()
///     .with_columns("value,time")
///     .with_limit(100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sources: Vec<DataSource>,
    columns: Option<String>,
    limit: u64,
    offset: u64,
}

impl Statement {
    /// Create a statement over the given sources.
    ///
    /// Fails with [`ClientError::InvalidStatement`] when no source is given
    /// or when a source has no segment at all, rather than deferring to
    /// render time and producing text the server would reject with a
    /// confusing parse error.
    pub fn select(sources: Vec<DataSource>) -> ClientResult<Self> {
        if sources.is_empty() || sources.iter().any(DataSource::is_empty) {
            return Err(ClientError::InvalidStatement);
        }
        Ok(Self {
            sources,
            columns: None,
            limit: 0,
            offset: 0,
        })
    }

    /// Set the column expression, verbatim.
    ///
    /// No escaping is applied - the caller supplies valid query-language
    /// text. The empty string clears any prior spec back to `*`.
    pub fn with_columns(mut self, spec: impl Into<String>) -> Self {
        let spec = spec.into();
        self.columns = if spec.is_empty() { None } else { Some(spec) };
        self
    }

    /// Set the row limit. Zero means "no LIMIT clause".
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the row offset. Zero means "no OFFSET clause".
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Render the statement to query text.
    ///
    /// Deterministic and side-effect free; the output carries no trailing
    /// whitespace.
    pub fn render(&self) -> String {
        let mut out = String::from("SELECT ");
        out.push_str(self.columns.as_deref().unwrap_or("*"));

        if !self.sources.is_empty() {
            out.push_str(" FROM ");
            let rendered: Vec<String> = self.sources.iter().map(DataSource::render).collect();
            out.push_str(&rendered.join(","));
        }

        if self.limit != 0 {
            out.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset != 0 {
            out.push_str(&format!(" OFFSET {}", self.offset));
        }

        out
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Retention policy descriptor
///
/// Data carrier for the administrative commands; duration fields are
/// InfluxQL duration literals (`"1h"`, `"30m"`, `"52w"`) passed through
/// unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Policy name; empty lets the server pick its default name
    pub name: String,
    /// How long data is kept, e.g. `"30d"`
    pub duration: String,
    /// Number of independent copies stored in the cluster
    pub replication: Option<u32>,
    /// Shard group duration, e.g. `"1h"`
    pub shard_group_duration: String,
}

impl RetentionPolicy {
    /// Render the `WITH ...` clause suffix used by `CREATE DATABASE`, or an
    /// empty string when no field is set.
    pub(crate) fn render_with_clause(&self) -> String {
        let mut out = String::new();
        if !self.duration.is_empty() {
            out.push_str(&format!(" DURATION {}", self.duration));
        }
        if let Some(n) = self.replication {
            out.push_str(&format!(" REPLICATION {}", n));
        }
        if !self.shard_group_duration.is_empty() {
            out.push_str(&format!(" SHARD DURATION {}", self.shard_group_duration));
        }
        if !self.name.is_empty() {
            out.push_str(&format!(" NAME {}", quote(&self.name)));
        }
        if out.is_empty() {
            out
        } else {
            format!(" WITH{}", out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_measurement_only() {
        let src = DataSource::measurement("m");
        assert_eq!(src.render(), "\"m\"");
    }

    #[test]
    fn test_source_database_and_measurement() {
        let src = DataSource::measurement("m").with_database("db");
        assert_eq!(src.render(), "\"db\".\"m\"");
    }

    #[test]
    fn test_source_fully_qualified() {
        let src = DataSource::measurement("m")
            .with_database("db")
            .with_retention_policy("rp");
        assert_eq!(src.render(), "\"db\".\"rp\".\"m\"");
    }

    #[test]
    fn test_source_missing_database_placeholder() {
        let src = DataSource::measurement("m").with_retention_policy("rp");
        assert_eq!(src.render(), "\"\".\"rp\".\"m\"");
    }

    #[test]
    fn test_select_requires_source() {
        let err = Statement::select(vec![]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidStatement));
    }

    #[test]
    fn test_select_rejects_all_empty_source() {
        // An empty source would render "SELECT * FROM " with a dangling FROM
        let err = Statement::select(vec![DataSource::default()]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidStatement));
    }

    #[test]
    fn test_select_rejects_empty_source_among_valid_ones() {
        let err = Statement::select(vec![
            DataSource::measurement("cpu"),
            DataSource::default(),
        ])
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidStatement));
    }

    #[test]
    fn test_render_has_no_trailing_whitespace() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")]).unwrap();
        assert!(!stmt.render().ends_with(char::is_whitespace));
    }

    #[test]
    fn test_render_limit_offset() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")])
            .unwrap()
            .with_limit(10)
            .with_offset(5);
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu\" LIMIT 10 OFFSET 5");
    }

    #[test]
    fn test_render_with_columns() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")])
            .unwrap()
            .with_columns("value,time");
        assert_eq!(stmt.render(), "SELECT value,time FROM \"cpu\"");
    }

    #[test]
    fn test_zero_limit_and_offset_omitted() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")]).unwrap();
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu\"");
    }

    #[test]
    fn test_with_limit_preserves_offset() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")])
            .unwrap()
            .with_offset(20)
            .with_limit(10);
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu\" LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_empty_columns_clears_spec() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu")])
            .unwrap()
            .with_columns("value")
            .with_columns("");
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu\"");
    }

    #[test]
    fn test_multiple_sources_joined() {
        let stmt = Statement::select(vec![
            DataSource::measurement("cpu"),
            DataSource::measurement("mem").with_database("db"),
        ])
        .unwrap();
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu\",\"db\".\"mem\"");
    }

    #[test]
    fn test_quoted_source_names() {
        let stmt = Statement::select(vec![DataSource::measurement("cpu load")]).unwrap();
        assert_eq!(stmt.render(), "SELECT * FROM \"cpu load\"");
    }

    #[test]
    fn test_retention_policy_with_clause() {
        let policy = RetentionPolicy {
            name: "one_day".to_string(),
            duration: "1d".to_string(),
            replication: Some(1),
            shard_group_duration: "1h".to_string(),
        };
        assert_eq!(
            policy.render_with_clause(),
            " WITH DURATION 1d REPLICATION 1 SHARD DURATION 1h NAME one_day"
        );
    }

    #[test]
    fn test_retention_policy_empty_clause() {
        assert_eq!(RetentionPolicy::default().render_with_clause(), "");
    }
}
