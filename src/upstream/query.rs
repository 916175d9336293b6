//! Query-string normalization shared by every upstream endpoint
//!
//! Absent values are dropped, lists are sent as a JSON array string,
//! everything else goes through verbatim.

use crate::error::Result;

/// Ordered key/value pairs ready for URL encoding
pub type QueryParams = Vec<(String, String)>;

/// A single query parameter value before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    /// Multi-value filter, e.g. a symbol list
    List(Vec<String>),
    Absent,
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&[String]> for QueryValue {
    fn from(value: &[String]) -> Self {
        Self::List(value.to_vec())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Absent)
    }
}

/// Build the outbound query from declared parameters, preserving order
pub fn normalize<'a, I>(params: I) -> Result<QueryParams>
where
    I: IntoIterator<Item = (&'a str, QueryValue)>,
{
    let mut query = QueryParams::new();
    for (key, value) in params {
        match value {
            QueryValue::List(items) => query.push((key.to_string(), serde_json::to_string(&items)?)),
            QueryValue::Text(text) => query.push((key.to_string(), text)),
            QueryValue::Int(n) => query.push((key.to_string(), n.to_string())),
            QueryValue::Absent => {}
        }
    }
    Ok(query)
}
