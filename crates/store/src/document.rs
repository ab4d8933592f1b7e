use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Equality predicate on a (possibly dotted) field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Durable collection-oriented document store consumed by the engine.
///
/// Point reads after writes are assumed strongly consistent within one
/// organization. Counter fields must only be mutated through
/// [`DocumentStore::atomic_increment`], never by read-modify-write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a document and return its id. Documents carrying a string
    /// `id` field keep it; otherwise the store assigns one.
    async fn add(&self, collection: &str, document: Value) -> Result<String>;

    /// Point lookup. `None` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Apply a patch to an existing document. Each top-level key of `patch`
    /// is a (possibly dotted) field path whose value replaces the current
    /// one. Fails with `NotFound` for absent documents.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()>;

    /// Atomically add `delta` to a numeric field (dotted paths allowed,
    /// missing fields start at zero). Fails with `NotFound` for absent
    /// documents.
    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<()>;

    /// Equality query. An empty filter list scans the whole collection.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> Result<Vec<Value>>;
}
