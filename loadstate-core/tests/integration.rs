//! Integration Tests for Loader Wiring
//!
//! These tests verify that the loader, the projector and the store layer
//! work together through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use loadstate_core::loader::{FetchErrors, Loader, LoaderPhase};
use loadstate_core::poem::{summarize, MappedPoem, Poem};
use loadstate_core::poem_store::PoemStore;
use loadstate_core::store::{Computed, ComputedState, Store, SubscriberId, Watch};
use loadstate_core::LoaderError;

const ROSES_SUMMARY: &str = "Title: Roud Folk Song Index number 19798 First verse: Roses are red";

fn roses() -> Poem {
    Poem::from_json(
        r#"{
            "title": "Roud Folk Song Index number 19798",
            "verses": ["Roses are red", "Violets are blue,", "Sugar is sweet", "And so are you."]
        }"#,
    )
    .unwrap()
}

/// Test the projector against the loader's lifecycle without any store.
#[test]
fn projector_over_plain_loader() {
    let mut loader: Loader<Poem, String> = Loader::new();
    assert_eq!(summarize(loader.payload()), None);

    loader.start();
    assert!(loader.is_loading());
    assert_eq!(summarize(loader.payload()), None);

    loader.succeed(roses());
    assert_eq!(summarize(loader.payload()).as_deref(), Some(ROSES_SUMMARY));

    loader.fail(FetchErrors::one("gone".to_string()));
    assert_eq!(summarize(loader.payload()), None);
}

/// Test the empty-verse placeholder end to end.
#[test]
fn empty_poem_summary_uses_placeholder() {
    let store: PoemStore = PoemStore::new();
    let summary = store.summary();

    store.succeed(Poem::new("X", Vec::<String>::new()));
    assert_eq!(summary.get().as_deref(), Some("Title: X First verse: {missing}"));
}

/// Test that a computed summary follows the loader with no manual invalidation.
#[test]
fn computed_summary_follows_loader() {
    let store: PoemStore = PoemStore::new();
    let summary = store.summary();

    assert_eq!(summary.get(), None);
    assert_eq!(summary.state(), ComputedState::Clean);

    store.start();
    assert_eq!(summary.state(), ComputedState::Dirty);
    assert_eq!(summary.get(), None);

    store.succeed(roses());
    assert_eq!(summary.get().as_deref(), Some(ROSES_SUMMARY));

    store.fail(FetchErrors::one("offline".to_string()));
    assert_eq!(summary.get(), None);
}

/// Test that a computed value over the whole loader store sees every write.
#[test]
fn computed_over_loader_store() {
    let store: PoemStore = PoemStore::new();
    let loading = Computed::new(store.loader(), Loader::is_loading);

    assert!(!loading.get());
    store.start();
    assert!(loading.get());
    store.succeed(roses());
    assert!(!loading.get());
}

/// Test that a watch pushes the projection into another store.
#[test]
fn watch_projects_into_mapped_store() {
    let store: PoemStore = PoemStore::new();
    let mapped = Store::new(MappedPoem {
        summary: Some("stale".to_string()),
    });

    let watch = store.project_into(&mapped);
    assert_eq!(mapped.get(), MappedPoem::default());

    store.start();
    store.succeed(roses());
    assert_eq!(mapped.get().summary.as_deref(), Some(ROSES_SUMMARY));
    assert_eq!(watch.run_count(), 3);

    watch.dispose();
    store.fail(FetchErrors::one("offline".to_string()));
    assert_eq!(mapped.get().summary.as_deref(), Some(ROSES_SUMMARY));
}

/// Test the subscribe wiring: a raw callback that writes the projection.
#[test]
fn subscribe_writes_projection() {
    let store: PoemStore = PoemStore::new();
    let mapped = Store::new(MappedPoem::default());
    let writes = Arc::new(AtomicUsize::new(0));

    let target = mapped.clone();
    let writes_clone = writes.clone();
    let id = SubscriberId::new();
    store.loader().subscribe(id, move |loader| {
        target.set(MappedPoem::from_loader(loader));
        writes_clone.fetch_add(1, Ordering::SeqCst);
    });

    store.succeed(roses());
    assert_eq!(mapped.get().summary.as_deref(), Some(ROSES_SUMMARY));

    assert!(store.loader().unsubscribe(id));
    store.start();
    assert_eq!(writes.load(Ordering::SeqCst), 1);
    assert_eq!(mapped.get().summary.as_deref(), Some(ROSES_SUMMARY));
}

/// Test that a watch can feed a computed value in a second store.
#[test]
fn chained_projection() {
    let store: PoemStore = PoemStore::new();
    let mapped = Store::new(MappedPoem::default());
    let _watch = store.project_into(&mapped);

    let length = Computed::new(&mapped, |m: &MappedPoem| {
        m.summary.as_ref().map_or(0, String::len)
    });
    assert_eq!(length.get(), 0);

    store.succeed(roses());
    assert_eq!(length.get(), ROSES_SUMMARY.len());
}

/// Test that clones of a poem store share the loader.
#[test]
fn cloned_store_shares_loader() {
    let store: PoemStore = PoemStore::new();
    let handle = store.clone();
    let lazy = Watch::lazy(store.loader(), |_| {});

    handle.start();
    assert_eq!(store.phase(), LoaderPhase::Loading);
    assert_eq!(lazy.run_count(), 1);
}

/// Test that illegal failures are rejected before reaching the store.
#[test]
fn empty_error_list_never_reaches_store() {
    let store: PoemStore = PoemStore::new();
    store.start();

    let errors = FetchErrors::<String>::new(Vec::new());
    assert_eq!(errors.unwrap_err(), LoaderError::EmptyErrors);
    assert_eq!(store.phase(), LoaderPhase::Loading);
}

/// Test a full async fetch cycle with multiple errors.
#[tokio::test]
async fn fetch_cycle_with_errors() {
    let store: PoemStore = PoemStore::new();
    let summary = store.summary();

    let phase = store
        .fetch(|| async {
            Err(FetchErrors::new(["timeout".to_string(), "gave up".to_string()]).unwrap())
        })
        .await;
    assert_eq!(phase, LoaderPhase::Failed);
    assert_eq!(
        store.snapshot().errors().map(<[String]>::len),
        Some(2)
    );
    assert_eq!(summary.get(), None);

    let phase = store.fetch(|| async { Ok(roses()) }).await;
    assert_eq!(phase, LoaderPhase::Succeeded);
    assert_eq!(summary.get().as_deref(), Some(ROSES_SUMMARY));
}

/// Test fetches issued from separate tasks on a shared store.
#[tokio::test]
async fn fetches_from_spawned_tasks() {
    let store: PoemStore = PoemStore::new();
    let mut handles = Vec::new();

    for i in 0..4 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .fetch(move || async move { Ok(Poem::new(format!("poem {i}"), ["v"])) })
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), LoaderPhase::Succeeded);
    }

    assert_eq!(store.phase(), LoaderPhase::Succeeded);
    assert!(!store.snapshot().is_loading());
}

/// Test that a projection stays in step when writes race across threads.
#[test]
fn projection_matches_loader_under_concurrent_writes() {
    let store: PoemStore = PoemStore::new();
    let mapped = Store::new(MappedPoem::default());
    let _watch = store.project_into(&mapped);

    let first = Poem::new("A", ["alpha"]);
    let second = Poem::new("B", ["beta"]);

    for _ in 0..500 {
        std::thread::scope(|scope| {
            scope.spawn(|| store.succeed(first.clone()));
            scope.spawn(|| store.succeed(second.clone()));
        });

        assert_eq!(mapped.get(), MappedPoem::from_loader(&store.snapshot()));
    }
}

/// Test that a mixed stream of threaded transitions ends consistent.
#[test]
fn projection_matches_loader_after_threaded_transitions() {
    let store: PoemStore = PoemStore::new();
    let mapped = Store::new(MappedPoem::default());
    let _watch = store.project_into(&mapped);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let store = store.clone();
            scope.spawn(move || {
                for i in 0..250 {
                    match (worker + i) % 3 {
                        0 => store.start(),
                        1 => store.succeed(Poem::new(format!("{worker}-{i}"), ["v"])),
                        _ => store.fail(FetchErrors::one(format!("{worker}-{i}"))),
                    }
                }
            });
        }
    });

    assert_eq!(mapped.get(), MappedPoem::from_loader(&store.snapshot()));
}

/// Test a transition issued from inside a loader subscriber.
#[test]
fn nested_transition_reaches_projection() {
    let store: PoemStore = PoemStore::new();

    let completer = store.clone();
    store.loader().subscribe(SubscriberId::new(), move |loader| {
        if loader.is_loading() {
            completer.succeed(Poem::new("X", ["a verse"]));
        }
    });

    let mapped = Store::new(MappedPoem::default());
    let watch = store.project_into(&mapped);

    store.start();

    assert_eq!(store.phase(), LoaderPhase::Succeeded);
    assert_eq!(
        mapped.get().summary.as_deref(),
        Some("Title: X First verse: a verse")
    );
    // Initial run and the nested success; the overtaken `Loading` is skipped.
    assert_eq!(watch.run_count(), 2);
}

/// Test that the loader handle is read-only but fully observable.
#[test]
fn loader_handle_reads_and_versions() {
    let store: PoemStore = PoemStore::new();
    let loader = store.loader().clone();
    assert_eq!(loader.version(), 0);

    store.start();
    store.succeed(roses());

    assert_eq!(loader.version(), 2);
    assert_eq!(loader.with(|l| summarize(l.payload())).as_deref(), Some(ROSES_SUMMARY));
}

