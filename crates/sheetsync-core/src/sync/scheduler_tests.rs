//! Tests for pass sequencing and rescheduling.

use std::time::Duration;

use super::processor::SyncProcessor;
use super::scheduler::{SyncScheduler, DEFAULT_INTERVAL};
use super::test_support::{row, FakeDocs, FakeStore};
use super::types::SyncTarget;

fn three_targets() -> Vec<SyncTarget> {
    vec![
        SyncTarget::new("t1", "s1"),
        SyncTarget::new("t2", "s2"),
        SyncTarget::new("t3", "s3"),
    ]
}

fn three_docs() -> FakeDocs {
    FakeDocs::default()
        .with_document("s1", "2024-06-01T00:00:00Z", vec![row(&["A", "09:00"])])
        .with_document("s2", "2024-06-01T00:00:00Z", vec![row(&["B", "09:00"])])
        .with_document("s3", "2024-06-01T00:00:00Z", vec![row(&["C", "09:00"])])
}

#[test]
fn default_interval_is_thirty_minutes() {
    assert_eq!(DEFAULT_INTERVAL, Duration::from_secs(1800));
}

#[tokio::test]
async fn pass_processes_targets_in_order() {
    let docs = three_docs();
    let store = FakeStore::default();
    let scheduler = SyncScheduler::new(SyncProcessor::new(docs.clone(), store.clone()), three_targets());

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.updated, vec!["t1", "t2", "t3"]);
    assert!(summary.unchanged.is_empty());
    assert!(summary.finished_at >= summary.started_at);

    let lookups: Vec<_> = docs
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("last_update:"))
        .collect();
    assert_eq!(lookups, vec!["last_update:s1", "last_update:s2", "last_update:s3"]);
}

#[tokio::test]
async fn second_pass_only_rewrites_changed_documents() {
    let docs = three_docs();
    let store = FakeStore::default();
    let scheduler = SyncScheduler::new(SyncProcessor::new(docs.clone(), store.clone()), three_targets());

    scheduler.run_pass().await.unwrap();
    docs.set_modified("s2", "2024-06-02T00:00:00Z");

    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.updated, vec!["t2"]);
    assert_eq!(summary.unchanged, vec!["t1", "t3"]);
    assert_eq!(store.writes(), 4);
}

#[tokio::test]
async fn failure_aborts_remaining_targets() {
    let docs = three_docs();
    docs.fail("s2");
    let store = FakeStore::default();
    let scheduler = SyncScheduler::new(SyncProcessor::new(docs.clone(), store.clone()), three_targets());

    assert!(scheduler.run_pass().await.is_err());
    assert!(store.record("t1").is_some());
    assert!(store.record("t3").is_none());
    assert!(!docs.calls().iter().any(|c| c.ends_with("s3")));
}

#[tokio::test(start_paused = true)]
async fn failed_pass_is_retried_after_the_full_interval() {
    let docs = three_docs();
    docs.fail("s2");
    let store = FakeStore::default();
    let scheduler = SyncScheduler::new(SyncProcessor::new(docs.clone(), store.clone()), three_targets());

    let started = tokio::time::Instant::now();
    // Stop one second into the wait that follows the second pass.
    let shutdown = tokio::time::sleep(DEFAULT_INTERVAL + Duration::from_secs(1));
    let passes = scheduler.run_until(shutdown).await;

    assert_eq!(passes, 2);
    assert_eq!(started.elapsed(), DEFAULT_INTERVAL + Duration::from_secs(1));

    // Both passes stopped at s2; s3 was never reached.
    let lookups: Vec<_> = docs
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("last_update:"))
        .collect();
    assert_eq!(
        lookups,
        vec!["last_update:s1", "last_update:s2", "last_update:s1", "last_update:s2"]
    );
}

#[tokio::test(start_paused = true)]
async fn custom_interval_spaces_successful_passes() {
    let docs = three_docs();
    let store = FakeStore::default();
    let scheduler = SyncScheduler::new(SyncProcessor::new(docs, store.clone()), three_targets())
        .with_interval(Duration::from_secs(60));

    let passes = scheduler
        .run_until(tokio::time::sleep(Duration::from_secs(150)))
        .await;

    assert_eq!(passes, 3);
    // Only the first pass found anything new.
    assert_eq!(store.writes(), 3);
    assert_eq!(store.reads(), 9);
}
