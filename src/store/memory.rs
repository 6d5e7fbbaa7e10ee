//! In-process stores with the same contract as the HTTP clients.

use crate::error::StoreError;
use crate::store::{BlobStore, Query, RecordStore, StoreResult, id_string};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Value>>,
    next_id: i64,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows verbatim; rows without an `id` get a generated one.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.lock();
        for mut row in rows {
            assign_id(&mut tables, &mut row);
            tables.rows.entry(table.to_string()).or_default().push(row);
        }
    }

    /// Every later call touching `table` fails with a 503.
    pub fn fail_table(&self, table: &str) {
        self.lock().failing.insert(table.to_string());
    }

    pub fn recover_table(&self, table: &str) {
        self.lock().failing.remove(table);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock only means a test thread panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn assign_id(tables: &mut Tables, row: &mut Value) {
    if let Value::Object(map) = row {
        match map.get("id").and_then(Value::as_i64) {
            Some(id) => tables.next_id = tables.next_id.max(id),
            None if !map.contains_key("id") => {
                tables.next_id += 1;
                map.insert("id".to_string(), Value::from(tables.next_id));
            }
            None => {}
        }
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(dst), Value::Object(src)) = (target, patch) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
}

fn unavailable(table: &str) -> StoreError {
    StoreError::Api {
        status: 503,
        message: format!("table {} unavailable", table),
    }
}

fn row_id(row: &Value) -> Option<String> {
    row.get("id").and_then(id_string)
}

impl RecordStore for MemoryStore {
    fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let tables = self.lock();
        if tables.failing.contains(table) {
            return Err(unavailable(table));
        }
        let rows = tables.rows.get(table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }

    fn insert(&self, table: &str, row: &Value) -> StoreResult<Value> {
        let mut tables = self.lock();
        if tables.failing.contains(table) {
            return Err(unavailable(table));
        }
        let mut row = match row {
            Value::Object(_) => row.clone(),
            _ => Value::Object(Map::new()),
        };
        assign_id(&mut tables, &mut row);
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    fn update(&self, table: &str, id: &str, patch: &Value) -> StoreResult<Value> {
        let mut tables = self.lock();
        if tables.failing.contains(table) {
            return Err(unavailable(table));
        }
        let row = tables
            .rows
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| row_id(r).as_deref() == Some(id))
            })
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        merge(row, patch);
        Ok(row.clone())
    }

    fn upsert(&self, table: &str, row: &Value, on_conflict: &[&str]) -> StoreResult<Value> {
        let mut tables = self.lock();
        if tables.failing.contains(table) {
            return Err(unavailable(table));
        }

        let key: BTreeMap<&str, Option<&Value>> =
            on_conflict.iter().map(|k| (*k, row.get(*k))).collect();

        let existing = tables.rows.get_mut(table).and_then(|rows| {
            rows.iter_mut()
                .find(|r| key.iter().all(|(k, v)| r.get(*k) == *v))
        });

        if let Some(existing) = existing {
            merge(existing, row);
            return Ok(existing.clone());
        }

        let mut row = row.clone();
        assign_id(&mut tables, &mut row);
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.failing.contains(table) {
            return Err(unavailable(table));
        }
        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|r| row_id(r).as_deref() != Some(id));
        }
        Ok(())
    }
}

pub struct MemoryBlobStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: Mutex<bool>,
}

impl MemoryBlobStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(false),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    fn check(&self) -> StoreResult<()> {
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(unavailable(&self.bucket));
        }
        Ok(())
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> StoreResult<()> {
        self.check()?;
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), bytes);
        Ok(())
    }

    fn remove(&self, paths: &[String]) -> StoreResult<()> {
        self.check()?;
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        for p in paths {
            objects.remove(p);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}/{}", self.bucket, path)
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        let marker = format!("/{}/", self.bucket);
        url.split_once(&marker).map(|(_, p)| p.to_string())
    }
}
