//! Store Implementation
//!
//! A Store holds a value and the callbacks that want to hear about changes
//! to it.
//!
//! # How Stores Work
//!
//! 1. Reads clone the value (`get`) or borrow it for the length of a closure
//!    (`with`).
//!
//! 2. Writes (`set`, `update`) take the write lock, change the value, bump
//!    the store's version and take a snapshot.
//!
//! 3. After the lock is released, every subscriber is called with the
//!    snapshot, in registration order.
//!
//! # Ordering
//!
//! No lock is held while subscribers run, so a subscriber may read or write
//! any store, including the one that notified it. A write made from inside
//! a notification, or a write racing on another thread, is delivered to the
//! remaining subscribers before the older snapshot reaches them. Every
//! snapshot therefore carries the version it was written at, and consumers
//! that keep state derived from the store (such as [`Watch`]) discard
//! snapshots older than the last one they applied.
//!
//! # Read-only Handles
//!
//! [`ReadStore`] is the read and subscribe half of a store. A [`Store`]
//! dereferences to it, so anything taking `&ReadStore<T>` also accepts
//! `&Store<T>`. Owners hand out `ReadStore` to keep writes to themselves.
//!
//! [`Watch`]: super::Watch

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use super::SubscriberId;

/// Unique identifier for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

type Notify<T> = Arc<dyn Fn(u64, &T) + Send + Sync>;

/// The value together with the number of writes that produced it.
struct Versioned<T> {
    version: u64,
    value: T,
}

/// Read-only handle to a [`Store`].
///
/// Clones share the same cell. A `ReadStore` can read the value and manage
/// subscriptions but cannot write.
pub struct ReadStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    id: StoreId,

    value: Arc<RwLock<Versioned<T>>>,

    /// Notification callbacks, kept in registration order.
    subscribers: Arc<RwLock<IndexMap<SubscriberId, Notify<T>>>>,
}

impl<T> ReadStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().value.clone()
    }

    /// Get a clone of the current value and the version it was written at.
    ///
    /// A fresh store is at version 0; every write adds one.
    pub fn get_versioned(&self) -> (u64, T) {
        let guard = self.value.read();
        (guard.version, guard.value.clone())
    }

    /// Number of writes so far.
    pub fn version(&self) -> u64 {
        self.value.read().version
    }

    /// Read the current value without cloning it.
    ///
    /// The read lock is held while `f` runs, so `f` must not write to this
    /// store.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read().value)
    }

    /// Register a callback to run after every write.
    ///
    /// Registering the same ID twice replaces the earlier callback but keeps
    /// its position.
    pub fn subscribe<F>(&self, subscriber_id: SubscriberId, notify: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_versioned(subscriber_id, move |_, value| notify(value));
    }

    /// Like [`subscribe`](Self::subscribe), but the callback also receives
    /// the version of the snapshot it is handed.
    pub fn subscribe_versioned<F>(&self, subscriber_id: SubscriberId, notify: F)
    where
        F: Fn(u64, &T) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .insert(subscriber_id, Arc::new(notify));
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) -> bool {
        self.subscribers
            .write()
            .shift_remove(&subscriber_id)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn notify(&self, version: u64, snapshot: &T) {
        // Copy the callbacks out so they run without the lock held.
        let notifiers: Vec<Notify<T>> = self.subscribers.read().values().cloned().collect();

        trace!(
            store = self.id.raw(),
            version,
            subscribers = notifiers.len(),
            "store changed"
        );

        for notify in notifiers {
            notify(version, snapshot);
        }
    }
}

impl<T> Clone for ReadStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> fmt::Debug for ReadStore<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.value.read();
        f.debug_struct("ReadStore")
            .field("id", &self.id)
            .field("version", &guard.version)
            .field("value", &guard.value)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// A shared observable value of type `T`.
///
/// Reading and subscribing go through [`ReadStore`], which `Store`
/// dereferences to.
///
/// # Example
///
/// ```rust
/// use loadstate_core::store::{Store, SubscriberId};
///
/// let count = Store::new(0);
/// count.subscribe(SubscriberId::new(), |value| println!("count is {value}"));
///
/// count.set(5);
/// count.update(|value| *value += 1);
/// assert_eq!(count.get(), 6);
/// assert_eq!(count.version(), 2);
/// ```
pub struct Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    reader: ReadStore<T>,
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            reader: ReadStore {
                id: StoreId::next(),
                value: Arc::new(RwLock::new(Versioned { version: 0, value })),
                subscribers: Arc::new(RwLock::new(IndexMap::new())),
            },
        }
    }

    /// A read-only handle sharing this store's cell.
    pub fn reader(&self) -> ReadStore<T> {
        self.reader.clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Change the value in place and notify subscribers.
    ///
    /// The whole closure runs under the write lock, so other threads never
    /// observe a half-applied change. The version is bumped under the same
    /// lock, so versions follow the order the writes were applied in.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, version, snapshot) = {
            let mut guard = self.reader.value.write();
            let result = f(&mut guard.value);
            guard.version += 1;
            (result, guard.version, guard.value.clone())
        };

        self.reader.notify(version, &snapshot);
        result
    }
}

impl<T> Deref for Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = ReadStore<T>;

    fn deref(&self) -> &ReadStore<T> {
        &self.reader
    }
}

impl<T> Clone for Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
        }
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Store<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.reader.value.read();
        f.debug_struct("Store")
            .field("id", &self.reader.id)
            .field("version", &guard.version)
            .field("value", &guard.value)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
