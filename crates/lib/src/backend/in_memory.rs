//! In-memory backend implementation
//!
//! Stores collections of JSON records behind a read-write lock. Suitable for
//! tests, development, and the bundled `serve` command, with optional
//! persistence to a JSON file via [`InMemory::save_to_file`] and
//! [`InMemory::load_from_file`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Backend, BackendError, Payload};
use crate::{Clock, Error, Pagination, Result, SystemClock, user::User};

/// The current persistence file format version.
const PERSISTENCE_VERSION: u8 = 0;

/// Fields a `set` call may never overwrite.
const PROTECTED_FIELDS: &[&str] = &["id", "createdAt", "createdBy", "password"];

type Record = Map<String, Value>;

/// A simple in-memory backend keyed by collection path.
///
/// `push` assigns a UUID v4 `id` and stamps `createdAt`/`modifiedAt` from the
/// configured [`Clock`]; `createdBy`/`modifiedBy` come from the configured
/// user id. Passwords sent on registration are accepted and discarded, so
/// they are never stored or returned.
#[derive(Debug)]
pub struct InMemory {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    clock: Arc<dyn Clock>,
    user_id: Option<String>,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemory {
    /// Creates a new, empty store using the system clock and no user.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new, empty store stamping records with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock,
            user_id: None,
        }
    }

    /// Sets the authenticated user reported by [`Backend::user_id`].
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Inserts raw records into a collection as-is, without stamping.
    ///
    /// Non-object values are skipped.
    pub fn seed(&self, path: &str, records: impl IntoIterator<Item = Value>) {
        let mut collections = self.collections.write().unwrap();
        let collection = collections.entry(path.to_string()).or_default();
        for record in records {
            match record {
                Value::Object(map) => collection.push(map),
                other => tracing::warn!("skipping non-object seed record in {path}: {other}"),
            }
        }
    }

    /// Number of records stored under `path`.
    pub fn len(&self, path: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(path)
            .map_or(0, Vec::len)
    }

    /// Whether `path` holds no records.
    pub fn is_empty(&self, path: &str) -> bool {
        self.len(path) == 0
    }

    /// All records stored under `path`, in insertion order.
    pub fn records(&self, path: &str) -> Vec<Value> {
        self.collections
            .read()
            .unwrap()
            .get(path)
            .map(|records| records.iter().map(sanitize).collect())
            .unwrap_or_default()
    }

    /// Saves every collection to a JSON file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let collections = self.collections.read().unwrap().clone();
        let serializable = SerializableStore {
            version: PERSISTENCE_VERSION,
            collections,
        };
        let json = serde_json::to_string_pretty(&serializable)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
    }

    /// Loads a store previously written by [`InMemory::save_to_file`].
    pub async fn load_from_file<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })?;
        let serializable: SerializableStore = serde_json::from_str(&json)
            .map_err(|e| -> Error { BackendError::InvalidBody { source: e }.into() })?;
        Ok(Self {
            collections: RwLock::new(serializable.collections),
            clock,
            user_id: None,
        })
    }

    fn now(&self) -> Value {
        Value::String(self.clock.now_utc().to_rfc3339())
    }

    fn actor(&self) -> Value {
        self.user_id.clone().map_or(Value::Null, Value::String)
    }
}

fn has_id(record: &Record, id: &str) -> bool {
    match record.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

fn not_found(path: &str, id: &str) -> Error {
    BackendError::NotFound {
        path: path.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Copy of a record safe to hand to callers.
fn sanitize(record: &Record) -> Value {
    let mut record = record.clone();
    record.remove("password");
    Value::Object(record)
}

#[async_trait]
impl Backend for InMemory {
    async fn load(&self, path: &str, pagination: Option<&Pagination>) -> Result<Payload> {
        let collections = self.collections.read().unwrap();
        let records = collections.get(path).map(Vec::as_slice).unwrap_or_default();
        let mut listed: Vec<&Record> = records.iter().collect();

        if let Some(field) = pagination.and_then(|p| p.sort.as_deref()) {
            listed.sort_by_key(|record| {
                record
                    .get(field)
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
            });
        }

        let window = pagination
            .and_then(|p| p.window(listed.len()))
            .unwrap_or(0..listed.len());
        let page = listed[window].iter().map(|record| sanitize(record)).collect();
        Ok(Payload::Value(Value::Array(page)))
    }

    async fn get_by_id(&self, path: &str, id: &str) -> Result<Payload> {
        let collections = self.collections.read().unwrap();
        collections
            .get(path)
            .and_then(|records| records.iter().find(|record| has_id(record, id)))
            .map(|record| Payload::Value(sanitize(record)))
            .ok_or_else(|| not_found(path, id))
    }

    async fn push(&self, path: &str, body: String) -> Result<Payload> {
        let mut record: Record = serde_json::from_str(&body)
            .map_err(|e| -> Error { BackendError::InvalidBody { source: e }.into() })?;

        let now = self.now();
        record.remove("password");
        record.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        record.insert("createdAt".to_string(), now.clone());
        record.insert("modifiedAt".to_string(), now);
        record.insert("createdBy".to_string(), self.actor());

        let created = sanitize(&record);
        self.collections
            .write()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(record);
        tracing::debug!("created record in {path}: {created}");
        Ok(Payload::Value(created))
    }

    async fn set(&self, path: &str, id: &str, user: &User) -> Result<Payload> {
        let Value::Object(changes) = serde_json::to_value(user)? else {
            unreachable!("User always serializes to an object");
        };
        let now = self.now();
        let actor = self.actor();

        let mut collections = self.collections.write().unwrap();
        let record = collections
            .get_mut(path)
            .and_then(|records| records.iter_mut().find(|record| has_id(record, id)))
            .ok_or_else(|| not_found(path, id))?;

        for (key, value) in changes {
            if !PROTECTED_FIELDS.contains(&key.as_str()) {
                record.insert(key, value);
            }
        }
        record.insert("modifiedAt".to_string(), now);
        record.insert("modifiedBy".to_string(), actor);
        Ok(Payload::Value(sanitize(record)))
    }

    async fn remove(&self, path: &str, id: &str) -> Result<Payload> {
        let mut collections = self.collections.write().unwrap();
        let records = collections
            .get_mut(path)
            .ok_or_else(|| not_found(path, id))?;
        let position = records
            .iter()
            .position(|record| has_id(record, id))
            .ok_or_else(|| not_found(path, id))?;
        let removed = records.remove(position);
        Ok(Payload::Value(sanitize(&removed)))
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

/// Serializable form of the store for persistence
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(rename = "_v", default, deserialize_with = "validate_persistence_version")]
    version: u8,
    collections: HashMap<String, Vec<Record>>,
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}
