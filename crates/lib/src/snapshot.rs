//! Immutable snapshots of the user cache and their publisher.

use std::ops::Deref;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::user::User;

/// A point-in-time copy of the cached users.
///
/// Cloning is cheap and shares the same container. Every publication wraps a
/// freshly allocated container, so [`Snapshot::ptr_eq`] tells publications
/// apart even when their contents are equal.
#[derive(Debug, Clone, Default)]
pub struct Snapshot(Arc<Vec<Arc<User>>>);

impl Snapshot {
    /// Allocate a new snapshot holding `users`.
    pub fn new(users: Vec<Arc<User>>) -> Self {
        Self(Arc::new(users))
    }

    /// Whether both snapshots are the same publication.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Copy the records out of the snapshot.
    pub fn to_users(&self) -> Vec<User> {
        self.0.iter().map(|user| User::clone(user)).collect()
    }
}

impl Deref for Snapshot {
    type Target = [Arc<User>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Handle returned by [`SnapshotPublisher::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

/// Holds the latest snapshot and fans each new one out to subscribers.
///
/// Subscribers either hold a `watch` receiver, awaited on their own task, or
/// register a callback that runs wherever [`SnapshotPublisher::publish`] is
/// called from, which is the service's dispatcher.
pub struct SnapshotPublisher {
    tx: watch::Sender<Snapshot>,
    listeners: Mutex<Listeners>,
}

impl std::fmt::Debug for SnapshotPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotPublisher")
            .field("latest_len", &self.tx.borrow().len())
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    /// A publisher whose latest snapshot is empty.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::default());
        Self {
            tx,
            listeners: Mutex::new(Listeners::default()),
        }
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// A receiver that observes every publication from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Register a callback invoked with each published snapshot.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Unregister a callback. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    /// Replace the latest snapshot and notify every subscriber.
    ///
    /// Listeners run in registration order, after the lock is released so a
    /// listener may register or remove listeners itself.
    pub fn publish(&self, snapshot: Snapshot) {
        self.tx.send_replace(snapshot.clone());
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
