//! The user collection service.
//!
//! [`UserService`] loads users from a [`Backend`], keeps them in an ordered
//! in-memory cache, and republishes an immutable [`Snapshot`] of that cache
//! after every mutation. Publication is handed to a [`Dispatcher`] so
//! subscribers are notified in whatever execution context they need.
//!
//! The service assumes a single writer. The cache lock only makes the
//! service shareable between tasks; it is never held across an `.await`, so
//! concurrent operations interleave exactly as their backend calls resolve.

mod errors;


use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use tokio::sync::watch;

pub use errors::ServiceError;

use crate::{
    Pagination, Result,
    backend::{Backend, Payload, json_kind},
    dispatch::Dispatcher,
    snapshot::{ListenerId, Snapshot, SnapshotPublisher},
    user::{NewUser, User},
};

/// Collection path every call is addressed to.
pub const USERS_PATH: &str = "Users";

/// Cached, observable access to the `Users` collection.
pub struct UserService {
    backend: Arc<dyn Backend>,
    dispatcher: Arc<dyn Dispatcher>,
    publisher: Arc<SnapshotPublisher>,
    records: Mutex<Vec<Arc<User>>>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("count", &self.count())
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a service over `backend`, publishing through `dispatcher`.
    ///
    /// The cache and the latest snapshot both start empty.
    pub fn new(backend: Arc<dyn Backend>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            backend,
            dispatcher,
            publisher: Arc::new(SnapshotPublisher::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Replace the cache with the backend's listing and publish it.
    ///
    /// The cache is cleared before the request is sent and is not restored
    /// if the request or its decoding fails. Entries whose id is already
    /// cached are dropped.
    pub async fn load(&self, pagination: Option<&Pagination>) -> Result<()> {
        tracing::debug!("loading users...");
        self.cache().clear();

        let payload = self.backend.load(USERS_PATH, pagination).await?;
        tracing::debug!("response ({}) = {payload:?}", payload.kind());

        let entries = expect_list("load", payload)?;
        {
            let mut records = self.cache();
            for raw in &entries {
                let user = User::from_raw(raw);
                let duplicate = user
                    .id
                    .as_deref()
                    .is_some_and(|id| records.iter().any(|r| r.id.as_deref() == Some(id)));
                if duplicate {
                    tracing::warn!("dropping duplicate user {user} from listing");
                    continue;
                }
                records.push(Arc::new(user));
            }
        }

        self.publish_updates();
        Ok(())
    }

    /// Fetch a single user's raw data without caching it.
    pub async fn get(&self, id: &str) -> Result<Map<String, Value>> {
        if id.trim().is_empty() {
            return Err(ServiceError::MissingId { operation: "get" }.into());
        }
        tracing::debug!("retrieving a user = {id}");

        let payload = self.backend.get_by_id(USERS_PATH, id).await?;
        tracing::debug!("response ({}) = {payload:?}", payload.kind());

        expect_object("get", payload)
    }

    /// Number of cached users.
    pub fn count(&self) -> usize {
        self.cache().len()
    }

    /// Register a new user with the backend.
    ///
    /// The record is owned by the backend's authenticated user. The created
    /// entity is returned as the backend sent it; the cache is untouched.
    pub async fn add(&self, user: &User) -> Result<Payload> {
        let payload = NewUser::from_user(user, self.backend.user_id());
        tracing::debug!(
            "registering user {} <{}> owned by {:?}",
            payload.username,
            payload.email,
            payload.owner
        );
        let body = serde_json::to_string(&payload)?;
        self.backend.push(USERS_PATH, body).await
    }

    /// Send `user` to the backend and republish the cache.
    ///
    /// The backend's response is decoded and discarded. A cached record with
    /// the same id is replaced by `user`, so subscribers see the edit.
    pub async fn update(&self, user: &User) -> Result<()> {
        let id = require_id("update", user)?;
        tracing::debug!("updating a user = {user}");

        self.backend.set(USERS_PATH, id, user).await?.into_json()?;

        {
            let mut records = self.cache();
            if let Some(slot) = records.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
                let mut cached = user.clone();
                cached.password = None;
                *slot = Arc::new(cached);
            }
        }

        self.publish_updates();
        Ok(())
    }

    /// Delete `user` on the backend, drop it from the cache and republish.
    ///
    /// Returns a copy of the record marked `deleted`. The cached entry is
    /// matched by identity first. Since [`UserService::update`] swaps in a
    /// new `Arc` for the edited record, a caller holding the pre-update
    /// handle is matched by id instead. A user that is not cached leaves the
    /// cache unchanged. On backend failure nothing changes.
    pub async fn delete(&self, user: &Arc<User>) -> Result<User> {
        let id = require_id("delete", user)?;
        tracing::debug!("deleting a user = {user}");

        self.backend.remove(USERS_PATH, id).await?.into_json()?;

        let mut deleted = User::clone(user);
        deleted.deleted = true;
        deleted.deleting = false;

        {
            let mut records = self.cache();
            let position = records
                .iter()
                .position(|r| Arc::ptr_eq(r, user))
                .or_else(|| records.iter().position(|r| r.id.as_deref() == Some(id)));
            match position {
                Some(index) => {
                    records.remove(index);
                }
                None => tracing::debug!("user {id} was not cached; nothing to remove"),
            }
        }

        self.publish_updates();
        Ok(deleted)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.publisher.latest()
    }

    /// A receiver notified of every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Register a callback run, via the dispatcher, with every new snapshot.
    pub fn on_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.publisher.add_listener(listener)
    }

    /// Unregister a callback added with [`UserService::on_update`].
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.publisher.remove_listener(id)
    }

    fn cache(&self) -> MutexGuard<'_, Vec<Arc<User>>> {
        self.records.lock().unwrap()
    }

    /// Copy the cache now and schedule its publication on the dispatcher.
    fn publish_updates(&self) {
        let snapshot = Snapshot::new(self.cache().clone());
        let publisher = self.publisher.clone();
        self.dispatcher
            .run(Box::new(move || publisher.publish(snapshot)));
    }
}

fn require_id<'a>(operation: &'static str, user: &'a User) -> Result<&'a str> {
    match user.id.as_deref() {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ServiceError::MissingId { operation }.into()),
    }
}

fn expect_list(operation: &'static str, payload: Payload) -> Result<Vec<Value>> {
    match payload.into_json()? {
        Value::Array(entries) => Ok(entries),
        other => Err(unexpected(operation, "array", &other)),
    }
}

fn expect_object(operation: &'static str, payload: Payload) -> Result<Map<String, Value>> {
    match payload.into_json()? {
        Value::Object(map) => Ok(map),
        other => Err(unexpected(operation, "object", &other)),
    }
}

fn unexpected(operation: &'static str, expected: &'static str, found: &Value) -> crate::Error {
    ServiceError::UnexpectedFormat {
        operation,
        expected,
        found: json_kind(found),
    }
    .into()
}
