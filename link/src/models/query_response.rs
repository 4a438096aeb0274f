use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// Outcome of one table request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    /// Returned rows as JSON objects (empty for count-only or minimal mutations)
    pub rows: Vec<JsonValue>,

    /// Exact total row count, present when the request asked for one
    pub count: Option<u64>,
}

impl QueryResponse {
    pub fn new(rows: Vec<JsonValue>, count: Option<u64>) -> Self {
        Self { rows, count }
    }

    /// Decode every row into `T`.
    pub fn rows_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            out.push(serde_json::from_value(row.clone())?);
        }
        Ok(out)
    }

    /// Exact count, or 0 when none was returned.
    pub fn count_or_zero(&self) -> u64 {
        self.count.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
