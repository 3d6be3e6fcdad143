//! The document-store contract and its in-process implementation.
//!
//! All mutation is per-record: a full replace, a named-field merge, or an
//! additive array merge. There are no multi-step transactions and no locks
//! exposed to callers. Every committed mutation notifies subscriptions,
//! including those held by the mutating client itself.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::DateTime;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::{Result, StoreError};
use crate::subscribe::{self, DocEvent, Subscription};

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Change notification fanned out to subscription tasks.
#[derive(Debug, Clone)]
pub(crate) struct ChangeEvent {
    pub collection: String,
    pub key: String,
}

type Collections = HashMap<String, BTreeMap<String, Value>>;

pub(crate) struct StoreInner {
    pub collections: RwLock<Collections>,
    pub changes: broadcast::Sender<ChangeEvent>,
}

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// In-process document store with the same observable contract as the
/// hosted database. Cloning is cheap and every clone shares the same data.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

impl DocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                collections: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Handle to a named collection. Collections spring into existence on
    /// first write.
    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            inner: self.inner.clone(),
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one collection of keyed documents.
#[derive(Clone)]
pub struct Collection {
    pub(crate) name: String,
    pub(crate) inner: Arc<StoreInner>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full-replace write. Creates the record when absent.
    pub async fn write(&self, key: &str, document: Value) -> Result<()> {
        {
            let mut collections = self.lock_write()?;
            collections
                .entry(self.name.clone())
                .or_default()
                .insert(key.to_string(), document);
        }
        self.notify(key);
        Ok(())
    }

    /// Merge the named fields into an existing record. Fields not named are
    /// left untouched. Fails with [`StoreError::NotFound`] when the record
    /// does not exist.
    pub async fn update(&self, key: &str, fields: Map<String, Value>) -> Result<()> {
        {
            let mut collections = self.lock_write()?;
            let documents = collections.entry(self.name.clone()).or_default();
            let document = documents
                .get_mut(key)
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
            let Some(object) = document.as_object_mut() else {
                return Err(StoreError::InvalidDocument(format!(
                    "{key} is not an object"
                )));
            };
            for (name, value) in fields {
                object.insert(name, value);
            }
        }
        self.notify(key);
        Ok(())
    }

    /// Additive merge: push `value` onto the array field `field` without
    /// the caller ever reading the current array. Two clients appending
    /// concurrently both land; neither overwrites the other.
    pub async fn append_to_field(&self, key: &str, field: &str, value: Value) -> Result<()> {
        {
            let mut collections = self.lock_write()?;
            let documents = collections.entry(self.name.clone()).or_default();
            let document = documents
                .get_mut(key)
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
            let Some(object) = document.as_object_mut() else {
                return Err(StoreError::InvalidDocument(format!(
                    "{key} is not an object"
                )));
            };
            let entry = object
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Some(items) = entry.as_array_mut() else {
                return Err(StoreError::InvalidDocument(format!(
                    "field {field} of {key} is not an array"
                )));
            };
            items.push(value);
        }
        self.notify(key);
        Ok(())
    }

    /// Current state of one record, or `None` when absent.
    pub async fn read(&self, key: &str) -> Result<Option<Value>> {
        let collections = self.lock_read()?;
        Ok(collections
            .get(&self.name)
            .and_then(|documents| documents.get(key))
            .cloned())
    }

    /// All documents ordered by `sort_field`. RFC 3339 timestamp strings
    /// compare chronologically; other scalars compare as JSON values.
    pub async fn query_ordered(&self, sort_field: &str, direction: Direction) -> Result<Vec<Value>> {
        let mut documents: Vec<Value> = {
            let collections = self.lock_read()?;
            collections
                .get(&self.name)
                .map(|documents| documents.values().cloned().collect())
                .unwrap_or_default()
        };
        documents.sort_by(|a, b| compare_by_field(a, b, sort_field));
        if direction == Direction::Descending {
            documents.reverse();
        }
        Ok(documents)
    }

    /// Standing watch on one record: the current state (or a missing
    /// marker) arrives immediately, then a complete snapshot after every
    /// change to that record.
    pub fn subscribe_doc(&self, key: &str) -> Subscription<DocEvent> {
        subscribe::spawn_doc_watch(self.clone(), key.to_string())
    }

    /// Standing watch on the whole collection, re-delivering the full
    /// ordered snapshot after every mutation anywhere in it.
    pub fn subscribe_query(
        &self,
        sort_field: &str,
        direction: Direction,
    ) -> Subscription<Vec<Value>> {
        subscribe::spawn_query_watch(self.clone(), sort_field.to_string(), direction)
    }

    fn notify(&self, key: &str) {
        // No receivers is fine; subscriptions come and go.
        let _ = self.inner.changes.send(ChangeEvent {
            collection: self.name.clone(),
            key: key.to_string(),
        });
    }

    fn lock_read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner
            .collections
            .read()
            .map_err(|e| StoreError::Persistence(format!("lock poisoned: {e}")))
    }

    fn lock_write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .collections
            .write()
            .map_err(|e| StoreError::Persistence(format!("lock poisoned: {e}")))
    }
}

fn compare_by_field(a: &Value, b: &Value, field: &str) -> Ordering {
    let a = a.get(field);
    let b = b.get(field);
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
