//! crates/story_portal_core/src/memory.rs
//!
//! An in-process `ContentBackend` holding collections as JSON rows.
//!
//! It understands the subset of the backend's query language the catalog
//! emits: `_eq` filters (following one declared relation per segment),
//! `sort` with an optional `-` prefix, `limit`, and `fields` projection.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::ports::{ContentBackend, PortError, PortResult};
use crate::query::ItemQuery;

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    collections: HashMap<String, Vec<Value>>,
    /// (collection, field) -> related collection
    relations: HashMap<(String, String), String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, collection: &str, items: Vec<Value>) -> Self {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(items);
        self
    }

    /// Declares that `collection.field` holds the `id` of a row in `target`.
    pub fn with_relation(mut self, collection: &str, field: &str, target: &str) -> Self {
        self.relations.insert(
            (collection.to_string(), field.to_string()),
            target.to_string(),
        );
        self
    }

    fn resolve<'a>(&'a self, collection: &str, row: &'a Value, path: &[&str]) -> Option<&'a Value> {
        let (head, rest) = path.split_first()?;
        let value = row.get(*head)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Object(_) => self.resolve(collection, value, rest),
            id => {
                let target = self
                    .relations
                    .get(&(collection.to_string(), head.to_string()))?;
                let related = self
                    .collections
                    .get(target)?
                    .iter()
                    .find(|candidate| candidate.get("id") == Some(id))?;
                self.resolve(target, related, rest)
            }
        }
    }
}

#[async_trait]
impl ContentBackend for InMemoryBackend {
    async fn fetch(&self, path: &str, query: &ItemQuery) -> PortResult<Value> {
        let collection = path
            .strip_prefix("/items/")
            .ok_or_else(|| PortError::Status {
                status: 404,
                body: format!("no route for {path}"),
            })?;
        let rows = self
            .collections
            .get(collection)
            .ok_or_else(|| PortError::Status {
                status: 403,
                body: format!("collection {collection} does not exist"),
            })?;

        let mut filters = Vec::new();
        let mut sort = None;
        let mut limit = None;
        let mut fields = None;
        for (name, value) in query.normalized() {
            if let Some(path) = parse_filter(&name) {
                filters.push((path, value));
                continue;
            }
            match name.as_str() {
                "sort" => sort = Some(value),
                "limit" => {
                    limit = Some(value.parse::<usize>().map_err(|_| PortError::Status {
                        status: 400,
                        body: format!("invalid limit {value}"),
                    })?)
                }
                "fields" => fields = Some(value),
                _ => {}
            }
        }

        let mut matched: Vec<&Value> = rows
            .iter()
            .filter(|row| {
                filters.iter().all(|(path, expected)| {
                    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                    self.resolve(collection, row, &segments)
                        .and_then(scalar_string)
                        .is_some_and(|actual| &actual == expected)
                })
            })
            .collect();

        if let Some(sort) = sort {
            let (field, descending) = match sort.strip_prefix('-') {
                Some(field) => (field.to_string(), true),
                None => (sort, false),
            };
            matched.sort_by(|a, b| {
                let ord = compare(a.get(&field), b.get(&field));
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        if let Some(limit) = limit {
            matched.truncate(limit);
        }

        let data: Vec<Value> = match fields {
            Some(fields) => {
                let wanted: Vec<&str> = fields.split(',').collect();
                matched
                    .into_iter()
                    .map(|row| project(row, &wanted))
                    .collect()
            }
            None => matched.into_iter().cloned().collect(),
        };

        Ok(json!({ "data": data }))
    }
}

/// `filter[a][b][_eq]` -> `["a", "b"]`
fn parse_filter(name: &str) -> Option<Vec<String>> {
    let inner = name.strip_prefix("filter[")?.strip_suffix("][_eq]")?;
    Some(inner.split("][").map(str::to_string).collect())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, fields: &[&str]) -> Value {
    let Some(object) = row.as_object() else {
        return row.clone();
    };
    let projected: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(projected)
}
