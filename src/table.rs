//! Response-to-table mapping
//!
//! Converts the HTTP query API's decoded JSON response into a validated
//! [`Table`]. This is the single place where malformed or unexpected server
//! responses are detected, so every structural rule lives here:
//!
//! - exactly one result, exactly one series (more series is
//!   [`ClientError::NotSupported`], the design does not map multi-series
//!   responses);
//! - every row as wide as the column list;
//! - for scalar extraction, exactly one string-typed cell per row.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================
// Wire DTOs
// ============================================

/// Decoded body of a `/query` response
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<SeriesResult>,
    /// Top-level server error (bad query text, auth failure)
    #[serde(default)]
    pub error: Option<String>,
}

/// One result within a response
#[derive(Debug, Default, Deserialize)]
pub struct SeriesResult {
    #[serde(default)]
    pub series: Vec<Series>,
    /// Per-statement server error
    #[serde(default)]
    pub error: Option<String>,
}

/// One named, tagged block of rows within a result
#[derive(Debug, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
    #[serde(default)]
    pub partial: bool,
}

/// A single cell value as produced by the wire format
///
/// The query API only ever produces these four shapes, so cells are a
/// closed union rather than an open-ended dynamic type. JSON integers land
/// in [`Value::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Float(f64),
    String(String),
}

impl Value {
    /// The string content, if this is a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric content, if this is a numeric cell
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

// ============================================
// Table
// ============================================

/// One decoded series, validated and owned by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Series/measurement name as returned by the server
    pub name: String,
    /// Tag set for the series
    pub tags: HashMap<String, String>,
    /// Column names, in server order
    pub columns: Vec<String>,
    /// Row values; every row is exactly as wide as `columns`
    pub values: Vec<Vec<Value>>,
    /// Server-side truncation flag; surfaced to the caller, never retried
    pub partial: bool,
}

impl Table {
    /// Map a decoded response into a table.
    ///
    /// Fails with [`ClientError::EmptyResponse`] unless the response holds
    /// exactly one result with at least one series, and with
    /// [`ClientError::NotSupported`] when that result holds more than one
    /// series - a caller needing multiple series must issue multiple
    /// statements. Values are copied verbatim, no coercion.
    pub fn from_response(response: QueryResponse) -> ClientResult<Table> {
        if let Some(message) = response.error {
            return Err(ClientError::Server(message));
        }
        if response.results.len() != 1 {
            return Err(ClientError::EmptyResponse);
        }

        let Some(result) = response.results.into_iter().next() else {
            return Err(ClientError::EmptyResponse);
        };
        if let Some(message) = result.error {
            return Err(ClientError::Server(message));
        }
        if result.series.is_empty() {
            return Err(ClientError::EmptyResponse);
        }
        if result.series.len() > 1 {
            return Err(ClientError::NotSupported);
        }

        let Some(series) = result.series.into_iter().next() else {
            return Err(ClientError::EmptyResponse);
        };
        for (index, row) in series.values.iter().enumerate() {
            if row.len() != series.columns.len() {
                return Err(ClientError::UnexpectedResponse(format!(
                    "row {} has {} values for {} columns",
                    index,
                    row.len(),
                    series.columns.len()
                )));
            }
        }

        Ok(Table {
            name: series.name,
            tags: series.tags,
            columns: series.columns,
            values: series.values,
            partial: series.partial,
        })
    }

    /// Extract a single column of string values.
    ///
    /// The table must be named `dataset`, carry exactly one column named
    /// `column`, and every row must hold exactly one string cell; anything
    /// else is [`ClientError::UnexpectedResponse`]. The column-name check
    /// is enforced unconditionally, independent of the count check.
    pub fn scalar_values(&self, dataset: &str, column: &str) -> ClientResult<Vec<String>> {
        if self.name != dataset {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected dataset {:?}, got {:?}",
                dataset, self.name
            )));
        }
        if self.columns.len() != 1 {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected a single column, got {}",
                self.columns.len()
            )));
        }
        if self.columns[0] != column {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected column {:?}, got {:?}",
                column, self.columns[0]
            )));
        }

        let mut values = Vec::with_capacity(self.values.len());
        for row in &self.values {
            if row.len() != 1 {
                return Err(ClientError::UnexpectedResponse(format!(
                    "expected a single value per row, got {}",
                    row.len()
                )));
            }
            match row[0].as_str() {
                Some(s) => values.push(s.to_string()),
                None => {
                    return Err(ClientError::UnexpectedResponse(format!(
                        "expected a string value, got {:?}",
                        row[0]
                    )))
                }
            }
        }

        Ok(values)
    }
}
