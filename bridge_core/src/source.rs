use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Read request for the newest rows of one physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub table: String,
    pub order_by: String,
    pub descending: bool,
    pub limit: usize,
}

impl FetchRequest {
    /// The single most recent row by `order_by`.
    pub fn latest(table: impl Into<String>, order_by: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            order_by: order_by.into(),
            descending: true,
            limit: 1,
        }
    }
}

/// One row as returned by the store: field name to scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldProblem {
    Missing,
    NotNumeric(String),
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => f.write_str("is missing"),
            FieldProblem::NotNumeric(raw) => write!(f, "is not numeric (got {})", raw),
        }
    }
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Extracts a field as `f64`. Numeric strings are accepted since PostgREST
    /// may render `numeric` and `bigint` columns that way.
    pub fn numeric(&self, field: &str) -> std::result::Result<f64, FieldProblem> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(FieldProblem::Missing),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| FieldProblem::NotNumeric(n.to_string())),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FieldProblem::NotNumeric(format!("{:?}", s))),
            Some(other) => Err(FieldProblem::NotNumeric(other.to_string())),
        }
    }
}

impl From<Map<String, Value>> for SourceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Read access to the upstream metric store.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch up to `request.limit` rows ordered by `request.order_by`.
    /// An empty vector means the table currently has no rows.
    async fn fetch_latest(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>>;

    /// Check that `table` is reachable and readable.
    async fn probe(&self, _table: &str) -> Result<()> {
        Ok(())
    }
}

pub type DynSourceClient = Arc<dyn SourceClient>;
