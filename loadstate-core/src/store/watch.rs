//! Watch Implementation
//!
//! A Watch is a side-effecting callback that runs whenever its source store
//! changes.
//!
//! # Differences from Computed
//!
//! - Computed values return a value; watches do not.
//! - Computed values are lazy; watches run as soon as the source changes.
//! - Computed values cache their result; watches just run their callback.
//!
//! # Ordering
//!
//! A watch remembers the version of the last snapshot it ran with and skips
//! any snapshot that is not newer. Runs are serialized per watch, so when
//! writes nest inside notifications or race across threads, the last run
//! always sees the latest value. The callback must not write to its own
//! source store.
//!
//! A watch is active until [`Watch::dispose`] is called or its last handle
//! is dropped.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tracing::trace;

use super::{ReadStore, SubscriberId};

struct WatchInner {
    subscriber_id: SubscriberId,
    disposed: AtomicBool,
    run_count: AtomicUsize,

    /// Version of the last snapshot the callback ran with. Reentrant so a
    /// write nested inside the callback can still be applied.
    applied: ReentrantMutex<Cell<Option<u64>>>,

    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl WatchInner {
    fn release(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl Drop for WatchInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// A callback kept in sync with a store.
///
/// # Example
///
/// ```rust
/// use loadstate_core::store::{Store, Watch};
///
/// let count = Store::new(0);
/// let doubled = Store::new(0);
///
/// let target = doubled.clone();
/// let _watch = Watch::new(&count, move |n| target.set(n * 2));
///
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
#[must_use = "a watch stops when its last handle is dropped"]
pub struct Watch {
    inner: Arc<WatchInner>,
}

impl Watch {
    /// Create a watch that runs `run` now and after every write to `source`.
    pub fn new<S, F>(source: &ReadStore<S>, run: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(&S) + Send + Sync + 'static,
    {
        let run = Arc::new(run);
        let watch = Self::subscribe(source, run.clone());

        let (version, snapshot) = source.get_versioned();
        watch.apply(version, &*run, &snapshot);

        watch
    }

    /// Create a watch that first runs on the next write to `source`.
    pub fn lazy<S, F>(source: &ReadStore<S>, run: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(&S) + Send + Sync + 'static,
    {
        Self::subscribe(source, Arc::new(run))
    }

    fn subscribe<S, F>(source: &ReadStore<S>, run: Arc<F>) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(&S) + Send + Sync + 'static,
    {
        let subscriber_id = SubscriberId::new();
        let releaser = source.clone();
        let release: Box<dyn FnOnce() + Send> = Box::new(move || {
            releaser.unsubscribe(subscriber_id);
        });

        let inner = Arc::new(WatchInner {
            subscriber_id,
            disposed: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
            applied: ReentrantMutex::new(Cell::new(None)),
            release: Mutex::new(Some(release)),
        });

        let weak: Weak<WatchInner> = Arc::downgrade(&inner);
        source.subscribe_versioned(subscriber_id, move |version, value| {
            if let Some(inner) = weak.upgrade() {
                Watch { inner }.apply(version, &*run, value);
            }
        });

        Self { inner }
    }

    fn apply<S>(&self, version: u64, run: impl Fn(&S), value: &S) {
        let applied = self.inner.applied.lock();

        if self.is_disposed() {
            return;
        }
        if matches!(applied.get(), Some(last) if version <= last) {
            trace!(
                subscriber = self.inner.subscriber_id.raw(),
                version,
                "skipped stale snapshot"
            );
            return;
        }

        applied.set(Some(version));
        run(value);
        self.inner.run_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Stop the watch. Its callback will not run again.
    pub fn dispose(&self) {
        self.inner.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of times the callback has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }
}

impl Clone for Watch {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
