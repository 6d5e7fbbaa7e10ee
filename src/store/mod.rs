//! Boundary to the hosted backend: a relational record store and a blob store.
//!
//! Both are consumed through traits so views and the repository can be driven
//! by the HTTP clients in production and by the in-memory stores in tests.
//! Nothing here retries; a failed call surfaces as a [`StoreError`].

pub mod memory;
pub mod query;
pub mod rest;
pub mod storage;

use crate::error::StoreError;
use serde_json::Value;

pub use query::{Direction, Query};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// CRUD-style access to named tables of JSON rows.
pub trait RecordStore: Send + Sync {
    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Insert one row and return it as stored (with generated columns).
    fn insert(&self, table: &str, row: &Value) -> StoreResult<Value>;

    /// Patch the row whose `id` equals `id`.
    fn update(&self, table: &str, id: &str, patch: &Value) -> StoreResult<Value>;

    /// Insert or merge keyed on the `on_conflict` columns.
    fn upsert(&self, table: &str, row: &Value, on_conflict: &[&str]) -> StoreResult<Value>;

    fn delete(&self, table: &str, id: &str) -> StoreResult<()>;
}

/// Object storage for note attachments.
pub trait BlobStore: Send + Sync {
    fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    fn remove(&self, paths: &[String]) -> StoreResult<()>;

    /// Publicly fetchable URL for an uploaded object.
    fn public_url(&self, path: &str) -> String;

    /// Inverse of [`BlobStore::public_url`]; `None` for URLs outside this container.
    fn path_from_url(&self, url: &str) -> Option<String>;
}

/// Render a JSON id value as the string used in `id=eq.` filters.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
