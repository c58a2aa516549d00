//! Sync pass behaviour through the public scheduler entry points.

mod common;

use common::{engineering_directory, TestHarness};
use snitch_core::kernel::scheduled_tasks::run_guarded_pass;
use snitch_core::kernel::{operation, PassOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[tokio::test]
async fn failed_rule_is_isolated_and_counted() {
    let harness = TestHarness::new(engineering_directory());
    let guard = Arc::new(Mutex::new(()));

    let outcome = run_guarded_pass(&harness.deps, &guard, Duration::from_secs(5)).await;
    assert_eq!(outcome, PassOutcome::Completed);

    let report = harness.deps.reports.latest().await.unwrap();
    assert_eq!(report.groups[0].outcome.members(), ["a@co", "b@co"]);
    assert!(report.groups[1].outcome.members().is_empty());
    assert_eq!(report.degraded_rules(), 1);

    let metrics = &harness.deps.metrics;
    assert_eq!(metrics.success_count(operation::RESOLVE_GROUP), 1);
    assert_eq!(metrics.error_count(operation::RESOLVE_GROUP), 1);
    assert_eq!(metrics.success_count(operation::SYNC_PASS), 1);
}

#[tokio::test]
async fn overlapping_pass_is_skipped() {
    let harness = TestHarness::new(engineering_directory().with_delay(Duration::from_millis(200)));
    let guard = Arc::new(Mutex::new(()));

    let first = {
        let deps = harness.deps.clone();
        let guard = guard.clone();
        tokio::spawn(async move { run_guarded_pass(&deps, &guard, Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = run_guarded_pass(&harness.deps, &guard, Duration::from_secs(5)).await;

    assert_eq!(second, PassOutcome::Skipped);
    assert_eq!(first.await.unwrap(), PassOutcome::Completed);
    assert_eq!(
        harness
            .deps
            .metrics
            .error_count(operation::SYNC_PASS_SKIPPED),
        1
    );
    assert_eq!(harness.deps.metrics.success_count(operation::SYNC_PASS), 1);
}

#[tokio::test]
async fn counters_accumulate_across_passes() {
    let harness = TestHarness::new(engineering_directory());
    let guard = Arc::new(Mutex::new(()));

    for _ in 0..3 {
        run_guarded_pass(&harness.deps, &guard, Duration::from_secs(5)).await;
    }

    let metrics = &harness.deps.metrics;
    assert_eq!(metrics.success_count(operation::SYNC_PASS), 3);
    assert_eq!(metrics.error_count(operation::RESOLVE_GROUP), 3);
    // sub@co is fetched once per pass
    assert_eq!(harness.directory.call_count("sub@co"), 3);
}
