use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::document::{DocumentStore, Filter};
use crate::error::{Result, StoreError};

/// In-memory [`DocumentStore`] used by tests and single-process embedders.
///
/// One lock guards the whole store, so every operation, increments
/// included, is atomic with respect to concurrent callers.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn write_path(document: &mut Value, path: &str, value: Value) {
    let mut current = document;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let map = match current {
            Value::Object(map) => map,
            other => {
                *other = Value::Object(Map::new());
                other.as_object_mut().unwrap()
            }
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, mut document: Value) -> Result<String> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }
        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                document
                    .as_object_mut()
                    .unwrap()
                    .insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        let fields = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::InvalidDocument(
                    "patch must be a JSON object".to_string(),
                ))
            }
        };

        let mut collections = self.collections.lock().unwrap();
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (path, value) in fields {
            write_path(document, &path, value);
        }
        Ok(())
    }

    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let current = lookup_path(document, field)
            .and_then(Value::as_i64)
            .unwrap_or(0);
        write_path(document, field, Value::from(current + delta));
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let collections = self.collections.lock().unwrap();
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let mut matches: Vec<Value> = docs
            .values()
            .filter(|doc| {
                filters
                    .iter()
                    .all(|f| lookup_path(doc, &f.field) == Some(&f.value))
            })
            .cloned()
            .collect();

        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }
}
