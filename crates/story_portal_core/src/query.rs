//! crates/story_portal_core/src/query.rs
//!
//! Query parameters for collection requests against the content backend,
//! plus the publication predicates every public read goes through.

use std::collections::BTreeMap;

/// A scalar query parameter value before it is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Null,
}

impl QueryValue {
    /// The string form sent to the backend, or `None` for a dropped value.
    ///
    /// The backend filter syntax is string-based, so numbers and booleans are
    /// rendered the way they would be typed in a URL (`3`, `2.5`, `true`).
    pub fn normalize(&self) -> Option<String> {
        match self {
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Integer(n) => Some(n.to_string()),
            QueryValue::Number(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Null => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Integer(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

/// An ordered set of named query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    params: BTreeMap<String, QueryValue>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw parameter, replacing any previous value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Equality filter on a field, following relations through `path`.
    ///
    /// `filter_eq(&["story", "slug"], "x")` becomes `filter[story][slug][_eq]=x`.
    pub fn filter_eq(self, path: &[&str], value: impl Into<QueryValue>) -> Self {
        let mut name = String::from("filter");
        for segment in path {
            name.push('[');
            name.push_str(segment);
            name.push(']');
        }
        name.push_str("[_eq]");
        self.param(name, value)
    }

    /// Sort by a field; a leading `-` sorts descending.
    pub fn sort(self, field: &str) -> Self {
        self.param("sort", field)
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    /// Field projection. Fields not listed are never requested.
    pub fn fields(self, fields: &[&str]) -> Self {
        self.param("fields", fields.join(","))
    }

    /// Adds every parameter of `other`, which wins on name collisions.
    pub fn merge(mut self, other: ItemQuery) -> Self {
        self.params.extend(other.params);
        self
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.params.get(name)
    }

    /// Parameters with nulls dropped and every value stringified.
    pub fn normalized(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter_map(|(name, value)| value.normalize().map(|v| (name.clone(), v)))
            .collect()
    }
}

/// Restricts a collection query to rows whose status is `published`.
pub fn published_filter() -> ItemQuery {
    ItemQuery::new().filter_eq(&["status"], "published")
}

/// Restricts the themes collection to active rows.
///
/// Themes are not versioned through drafts, so they get their own predicate.
pub fn active_filter() -> ItemQuery {
    ItemQuery::new().filter_eq(&["is_active"], true)
}
