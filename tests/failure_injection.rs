//! Failure injection tests for the bootstrap protocol.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use dataset_bootstrap::bootstrap::{BootstrapCoordinator, BootstrapStatus, Marker, SetupPlan};
use dataset_bootstrap::dataset;
use dataset_bootstrap::resilience::FailureCategory;
use dataset_bootstrap::store::{MemoryStore, Query, QueryResult, StoreClient};

mod common;

use common::{define, FaultKind, FlakyStore, Point};

fn three_step_plan() -> SetupPlan {
    SetupPlan::new(Marker::Attribute("c/flag".to_string()))
        .step("a", define("a/flag"))
        .step("b", define("b/flag"))
        .step("c", define("c/flag"))
}

fn coordinator(store: &FlakyStore) -> BootstrapCoordinator {
    BootstrapCoordinator::with_default_policy(Arc::new(store.clone()))
}

#[tokio::test(start_paused = true)]
async fn test_transient_step_failure_retries_that_step_only() {
    let store = FlakyStore::default();
    store.script(
        Point::Transact,
        [None, Some(FaultKind::Busy), Some(FaultKind::Unavailable)],
    );

    let started = Instant::now();
    let status = coordinator(&store)
        .ensure_initialized("things", &three_step_plan())
        .await
        .unwrap();

    assert_eq!(status, BootstrapStatus::Initialized);
    assert_eq!(
        store.transact_labels(),
        vec!["a/flag", "b/flag", "b/flag", "b/flag", "c/flag"]
    );
    // 200ms after the first failure, 400ms after the second
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(600), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(700), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_connect_exhaustion_is_fatal() {
    let store = FlakyStore::default();
    store.fail_next(Point::Connect, FaultKind::Unavailable, 11);

    let started = Instant::now();
    let err = coordinator(&store)
        .ensure_initialized("things", &three_step_plan())
        .await
        .unwrap_err();

    assert_eq!(err.category(), FailureCategory::Unavailable);
    assert_eq!(store.count(Point::Connect), 11);
    assert_eq!(store.count(Point::Transact), 0);
    // 200ms * (1 + 2 + ... + 10)
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(11_000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(11_100), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_on_connect_is_not_retried() {
    let store = FlakyStore::default();
    store.fail_next(Point::Connect, FaultKind::NotFound, 1);

    let err = coordinator(&store)
        .ensure_initialized("things", &three_step_plan())
        .await
        .unwrap_err();

    assert_eq!(err.category(), FailureCategory::NotFound);
    assert_eq!(store.count(Point::Connect), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_snapshot_failure_is_retried() {
    let store = FlakyStore::default();
    store.fail_next(Point::Snapshot, FaultKind::Interrupted, 2);

    let status = coordinator(&store)
        .ensure_initialized("things", &three_step_plan())
        .await
        .unwrap();

    assert_eq!(status, BootstrapStatus::Initialized);
    assert_eq!(store.count(Point::Snapshot), 3);
    assert_eq!(store.count(Point::Transact), 3);
}

#[tokio::test]
async fn test_fatal_step_leaves_partial_state_and_rerun_completes() {
    let store = FlakyStore::default();
    store.script(Point::Transact, [None, Some(FaultKind::Rejected)]);
    let coordinator = coordinator(&store);
    let plan = three_step_plan();

    let err = coordinator.ensure_initialized("things", &plan).await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Other);
    assert_eq!(store.transact_labels(), vec!["a/flag", "b/flag"]);

    let conn = store.inner().connect("things").await.unwrap();
    let snapshot = conn.snapshot().await.unwrap();
    assert!(snapshot.has_attribute("a/flag"));
    assert!(!snapshot.has_attribute("b/flag"));
    assert!(!snapshot.has_attribute("c/flag"));

    // The marker is still absent, so a later run applies every step again.
    store.reset_calls();
    let status = coordinator.ensure_initialized("things", &plan).await.unwrap();
    assert_eq!(status, BootstrapStatus::Initialized);
    assert_eq!(store.transact_labels(), vec!["a/flag", "b/flag", "c/flag"]);
}

#[tokio::test]
async fn test_initialized_dataset_costs_one_snapshot_and_no_writes() {
    let store = FlakyStore::default();
    let coordinator = coordinator(&store);
    let plan = dataset::catalog_plan();

    coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap();
    store.reset_calls();

    let status = coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap();
    assert_eq!(status, BootstrapStatus::AlreadyInitialized);
    assert_eq!(store.count(Point::Connect), 1);
    assert_eq!(store.count(Point::Snapshot), 1);
    assert_eq!(store.count(Point::Transact), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_bootstraps_do_not_duplicate() {
    let store = MemoryStore::new();
    let plan = dataset::catalog_plan();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let coordinator = BootstrapCoordinator::with_default_policy(Arc::new(store.clone()));
        let plan = plan.clone();
        handles.push(tokio::spawn(async move {
            coordinator.ensure_initialized(dataset::CATALOG, &plan).await
        }));
    }

    for handle in handles {
        let status = handle.await.unwrap().unwrap();
        assert!(matches!(
            status,
            BootstrapStatus::Initialized | BootstrapStatus::AlreadyInitialized
        ));
    }

    let conn = store.connect(dataset::CATALOG).await.unwrap();
    let snapshot = conn.snapshot().await.unwrap();
    match snapshot.read(&Query::Values(dataset::TITLE.to_string())).unwrap() {
        QueryResult::Values(titles) => assert_eq!(titles.len(), dataset::MOVIES.len()),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_catalog_rerun_completes_after_seed_step_fails() {
    let store = FlakyStore::default();
    // Schema commits, then the seed batch is rejected.
    store.script(Point::Transact, [None, Some(FaultKind::Rejected)]);
    let coordinator = coordinator(&store);
    let plan = dataset::catalog_plan();

    let err = coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Other);

    let status = coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap();
    assert_eq!(status, BootstrapStatus::Initialized);

    let conn = store.inner().connect(dataset::CATALOG).await.unwrap();
    let snapshot = conn.snapshot().await.unwrap();
    match snapshot.read(&Query::Values(dataset::TITLE.to_string())).unwrap() {
        QueryResult::Values(titles) => assert_eq!(titles.len(), dataset::MOVIES.len()),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_catalog_rerun_completes_after_seed_step_exhausts_retries() {
    let store = FlakyStore::default();
    store.script(Point::Transact, [None]);
    store.fail_next(Point::Transact, FaultKind::Busy, 11);
    let coordinator = coordinator(&store);
    let plan = dataset::catalog_plan();

    let err = coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Busy);

    let status = coordinator.ensure_initialized(dataset::CATALOG, &plan).await.unwrap();
    assert_eq!(status, BootstrapStatus::Initialized);
}
