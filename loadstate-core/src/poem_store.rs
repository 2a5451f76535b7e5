//! Poem Store
//!
//! [`PoemStore`] owns a `Loader<Poem, E>` inside an observable [`Store`] and
//! is the only thing that writes to it. It is constructed explicitly and
//! handed to whoever needs it; there is no global registry.
//!
//! Consumers read the loader through [`PoemStore::loader`], a read-only
//! handle, or attach derived state:
//!
//! - [`PoemStore::summary`] gives a lazily recomputed summary string.
//! - [`PoemStore::project_into`] keeps a `MappedPoem` store up to date.
//!
//! # Fetching
//!
//! [`PoemStore::fetch`] marks the loader as loading, awaits the supplied
//! future and records its outcome. Fetches on the same store are serialized,
//! so at most one is in flight and their transitions never interleave. A
//! fetch future dropped before completion puts the loader back to idle.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::loader::{FetchErrors, Loader, LoaderPhase};
use crate::poem::{summarize, MappedPoem, Poem};
use crate::store::{Computed, ReadStore, Store, Watch};

/// The owner of a poem loader.
///
/// Clones share the same loader and the same fetch queue.
pub struct PoemStore<E = String>
where
    E: Clone + Send + Sync + 'static,
{
    loader: Store<Loader<Poem, E>>,
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<E> PoemStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Create a store holding an idle loader.
    pub fn new() -> Self {
        Self {
            loader: Store::new(Loader::new()),
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// The observable loader, read-only. Writes go through this type's
    /// transition methods.
    ///
    /// ```compile_fail
    /// use loadstate_core::loader::Loader;
    /// use loadstate_core::poem_store::PoemStore;
    ///
    /// let poems: PoemStore = PoemStore::new();
    /// poems.loader().set(Loader::new());
    /// ```
    pub fn loader(&self) -> &ReadStore<Loader<Poem, E>> {
        &self.loader
    }

    /// A copy of the loader as it is now.
    pub fn snapshot(&self) -> Loader<Poem, E> {
        self.loader.get()
    }

    pub fn phase(&self) -> LoaderPhase {
        self.loader.with(Loader::phase)
    }

    pub fn start(&self) {
        self.transition(Loader::start);
    }

    pub fn succeed(&self, poem: Poem) {
        self.transition(|loader| loader.succeed(poem));
    }

    pub fn fail(&self, errors: FetchErrors<E>) {
        self.transition(|loader| loader.fail(errors));
    }

    /// Run `fetch` and record its outcome.
    ///
    /// Waits for any fetch already running on this store to finish first.
    /// Returns the loader's phase once the outcome is recorded. If the
    /// returned future is dropped after the fetch started, the loader is
    /// reset to idle.
    pub async fn fetch<F, Fut>(&self, fetch: F) -> LoaderPhase
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Poem, FetchErrors<E>>>,
    {
        let _guard = self.fetch_lock.lock().await;

        self.start();
        let in_flight = InFlight { store: self, settled: false };
        let outcome = fetch().await;
        in_flight.settle();

        if let Err(errors) = &outcome {
            warn!(
                store = self.loader.id().raw(),
                errors = errors.len(),
                "poem fetch failed"
            );
        }

        self.transition(|loader| loader.settle(outcome))
    }

    /// The current summary, recomputed after each transition when read.
    pub fn summary(&self) -> Computed<Option<String>> {
        Computed::new(&self.loader, |loader| summarize(loader.payload()))
    }

    /// Write the projection of every transition into `target`.
    ///
    /// `target` is updated immediately and then after each transition until
    /// the returned watch is disposed or dropped.
    pub fn project_into(&self, target: &Store<MappedPoem>) -> Watch {
        let target = target.clone();
        Watch::new(&self.loader, move |loader| {
            target.set(MappedPoem::from_loader(loader));
        })
    }

    fn transition(&self, apply: impl FnOnce(&mut Loader<Poem, E>)) -> LoaderPhase {
        let (from, to) = self.loader.update(|loader| {
            let from = loader.phase();
            apply(loader);
            (from, loader.phase())
        });

        debug!(store = self.loader.id().raw(), %from, %to, "loader transition");
        to
    }
}

/// Resets the loader if a fetch is abandoned between `start` and `settle`.
struct InFlight<'a, E>
where
    E: Clone + Send + Sync + 'static,
{
    store: &'a PoemStore<E>,
    settled: bool,
}

impl<E> InFlight<'_, E>
where
    E: Clone + Send + Sync + 'static,
{
    fn settle(mut self) {
        self.settled = true;
    }
}

impl<E> Drop for InFlight<'_, E>
where
    E: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                store = self.store.loader.id().raw(),
                "poem fetch abandoned, resetting loader"
            );
            self.store.transition(Loader::reset);
        }
    }
}

impl<E> Clone for PoemStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            loader: self.loader.clone(),
            fetch_lock: Arc::clone(&self.fetch_lock),
        }
    }
}

impl<E> Default for PoemStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for PoemStore<E>
where
    E: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoemStore")
            .field("loader", &self.loader)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
