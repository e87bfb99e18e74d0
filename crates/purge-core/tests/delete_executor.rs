//! Concurrent deletion of a reduced stream

mod support;

use std::sync::Arc;

use purge_core::error::FatalExecutionError;
use purge_core::pipeline::{DeleteExecutor, DeletionOutcome};
use purge_core::stream::MemoryStream;

use support::ScriptedStore;

fn ten_records() -> MemoryStream {
    MemoryStream::sorted_files((0..10).map(|i| format!("repo/pkg-{i}.tgz")))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn item_failures_are_counted() {
    let store = Arc::new(ScriptedStore::default().failing_on(&[
        "repo/pkg-0.tgz",
        "repo/pkg-5.tgz",
        "repo/pkg-9.tgz",
    ]));

    let report = DeleteExecutor::new(store.clone(), 3)
        .run(ten_records())
        .await;

    assert_eq!(report.outcome, DeletionOutcome::new(7, 3));
    assert_eq!(report.not_attempted, 0);
    assert!(report.fatal.is_none());
    assert!(!report.is_success());
    assert_eq!(store.calls(), 10);
    assert_eq!(store.deleted().len(), 7);
}

#[tokio::test]
async fn unreachable_store_leaves_the_rest_not_attempted() {
    let store = Arc::new(ScriptedStore {
        fatal_after: Some(4),
        ..Default::default()
    });

    let report = DeleteExecutor::new(store.clone(), 1)
        .run(ten_records())
        .await;

    assert_eq!(report.outcome.success_count(), 4);
    assert_eq!(report.outcome.fail_count(), 0);
    assert_eq!(report.not_attempted, 6);
    assert!(matches!(report.fatal, Some(FatalExecutionError::Remote(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fatal_error_with_several_workers_accounts_for_every_record() {
    let store = Arc::new(ScriptedStore {
        fatal_after: Some(4),
        ..Default::default()
    });

    let report = DeleteExecutor::new(store.clone(), 3)
        .run(ten_records())
        .await;

    // in-flight calls may answer after the fatal one, all of them fatally
    assert_eq!(report.outcome.success_count(), 4);
    assert_eq!(report.outcome.total() + report.not_attempted, 10);
    assert!(report.fatal.is_some());
    assert!(store.calls() < 10);
}

#[tokio::test]
async fn empty_stream_does_nothing() {
    let store = Arc::new(ScriptedStore::default());

    let report = DeleteExecutor::new(store.clone(), 3)
        .run(MemoryStream::default())
        .await;

    assert_eq!(report.outcome, DeletionOutcome::default());
    assert!(report.is_success());
    assert_eq!(store.calls(), 0);
}
