use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: &str = "1.0";

/// The structured fixture shape shared by the JSON and YAML formats.
///
/// Rows are order-preserving maps so the column order of a fixture file
/// survives decoding and the generated statement is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDocument<V> {
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "Vec::new")]
    pub rows: Vec<IndexMap<String, V>>,
}

impl FixtureDocument<Option<String>> {
    /// Builds an export document, keying each row by `columns` in order.
    pub(crate) fn from_query(
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Self {
        let rows = rows
            .iter()
            .map(|values| columns.iter().cloned().zip(values.iter().cloned()).collect())
            .collect();

        Self {
            table: table.to_string(),
            version: EXPORT_VERSION.to_string(),
            rows,
        }
    }
}

/// A scalar cell of a structured fixture row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FixtureValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`, kept exact instead of widening to `f64`.
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl FixtureValue {
    /// Renders the value as a SQL literal: `NULL`, or a single-quoted string.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            other => quote_literal(&other.to_string()),
        }
    }
}

impl fmt::Display for FixtureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

pub(crate) fn quote_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}
