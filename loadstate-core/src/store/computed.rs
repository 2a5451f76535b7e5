//! Computed Implementation
//!
//! A Computed is a cached value derived from a store.
//!
//! # How Computed Values Work
//!
//! 1. On creation, the computed value subscribes to its source store. No
//!    computation runs yet.
//!
//! 2. Every write to the source bumps the computed value's generation.
//!
//! 3. On read, if the cache was filled at the current generation it is
//!    returned as is. Otherwise the value is recomputed from a fresh read of
//!    the source.
//!
//! The cache remembers the generation it was computed at, not a dirty flag,
//! so a write that lands while a recompute is running still leaves the
//! result stale and the next read recomputes again.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use super::{ReadStore, SubscriberId};

/// Whether a computed value's cache is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedState {
    /// The cached value reflects the latest write to the source.
    Clean,

    /// The source changed (or nothing was computed yet).
    Dirty,
}

struct ComputedInner<T> {
    subscriber_id: SubscriberId,

    /// Reads the source and derives the value.
    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// Bumped on every write to the source.
    generation: AtomicU64,

    /// Last computed value and the generation it was computed at.
    cache: RwLock<Option<(u64, T)>>,

    compute_count: AtomicUsize,

    /// Unsubscribes from the source.
    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl<T> ComputedInner<T> {
    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T> Drop for ComputedInner<T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.get_mut().take() {
            release();
        }
    }
}

/// A cached value derived from a store, invalidated by every write to it.
///
/// Clones share the cache. The subscription to the source is dropped with
/// the last clone.
///
/// # Example
///
/// ```rust
/// use loadstate_core::store::{Computed, Store};
///
/// let count = Store::new(2);
/// let doubled = Computed::new(&count, |n| n * 2);
/// assert_eq!(doubled.get(), 4);
///
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<ComputedInner<T>>,
}

impl<T> Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a computed value over `source`.
    ///
    /// `compute` does not run until the first [`get`](Self::get).
    pub fn new<S, F>(source: &ReadStore<S>, compute: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let subscriber_id = SubscriberId::new();

        let reader = source.clone();
        let releaser = source.clone();
        let release: Box<dyn FnOnce() + Send> = Box::new(move || {
            releaser.unsubscribe(subscriber_id);
        });

        let inner = Arc::new(ComputedInner {
            subscriber_id,
            compute: Box::new(move || reader.with(|value| compute(value))),
            generation: AtomicU64::new(0),
            cache: RwLock::new(None),
            compute_count: AtomicUsize::new(0),
            release: Mutex::new(Some(release)),
        });

        let weak: Weak<ComputedInner<T>> = Arc::downgrade(&inner);
        source.subscribe(subscriber_id, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.invalidate();
            }
        });

        Self { inner }
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Get the current value, recomputing if the source changed.
    pub fn get(&self) -> T {
        let generation = self.inner.generation.load(Ordering::SeqCst);

        if let Some((cached_at, value)) = &*self.inner.cache.read() {
            if *cached_at == generation {
                return value.clone();
            }
        }

        self.recompute(generation)
    }

    fn recompute(&self, generation: u64) -> T {
        let value = (self.inner.compute)();
        let count = self.inner.compute_count.fetch_add(1, Ordering::SeqCst) + 1;

        trace!(
            subscriber = self.inner.subscriber_id.raw(),
            generation,
            count,
            "recomputed"
        );

        *self.inner.cache.write() = Some((generation, value.clone()));
        value
    }

    pub fn state(&self) -> ComputedState {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        match &*self.inner.cache.read() {
            Some((cached_at, _)) if *cached_at == generation => ComputedState::Clean,
            _ => ComputedState::Dirty,
        }
    }

    /// Whether the value has been computed at least once.
    pub fn has_value(&self) -> bool {
        self.inner.cache.read().is_some()
    }

    /// Number of times the computation has run.
    pub fn compute_count(&self) -> usize {
        self.inner.compute_count.load(Ordering::SeqCst)
    }
}

impl<T> Clone for Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Computed<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("state", &self.state())
            .field("compute_count", &self.compute_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
