//! Run Contract Test: Idempotency
//!
//! Constraints verified:
//! - A zone that is already up to date is never written to
//! - Applying a run's change and running again writes nothing
//! - A later IP change is picked up by the next run
//!
//! If this test fails, scheduled runs would churn the zone.

mod common;

use common::*;
use ddns_core::records::ExistingRecord;
use ddns_core::store::MemoryZoneStore;
use ddns_core::{RunOutcome, SyncRunner};

#[tokio::test]
async fn up_to_date_zone_is_not_written() {
    let zone = MemoryZoneStore::with_zone(
        ZONE,
        vec![
            ExistingRecord::a("a.example.com.", "5.6.7.8", 300),
            ExistingRecord::a("b.example.com.", "5.6.7.8", 3600),
        ],
    );
    let store = CountingZoneStore::new(zone.clone());

    let (runner, _events) = SyncRunner::new(
        Box::new(FixedIpResolver::new(ip(5, 6, 7, 8))),
        Box::new(CountingZoneStore::sharing_counters_with(&store)),
        &config_for(&["a.example.com", "b.example.com"]),
    )
    .expect("runner construction succeeds");

    let outcome = runner.run().await.expect("run succeeds");

    assert_eq!(outcome, RunOutcome::Unchanged);
    assert_eq!(store.list_call_count(), 1);
    assert_eq!(
        store.apply_call_count(),
        0,
        "No provider write expected for an up-to-date zone"
    );
    assert!(zone.applied_changes().await.is_empty());
}

#[tokio::test]
async fn second_run_after_apply_is_a_no_op() {
    let zone = MemoryZoneStore::with_zone(
        ZONE,
        vec![
            ExistingRecord::a("a.example.com.", "5.6.7.8", 300),
            ExistingRecord::a("b.example.com.", "1.2.3.4", 900),
            ExistingRecord::a("unrelated.example.com.", "1.2.3.4", 900),
        ],
    );
    let store = CountingZoneStore::new(zone.clone());
    let config = config_for(&["a.example.com", "b.example.com", "c.example.com"]);

    // First run: b is stale, c is missing
    {
        let (runner, _events) = SyncRunner::new(
            Box::new(FixedIpResolver::new(ip(5, 6, 7, 8))),
            Box::new(CountingZoneStore::sharing_counters_with(&store)),
            &config,
        )
        .expect("runner construction succeeds");

        let outcome = runner.run().await.expect("first run succeeds");
        assert!(matches!(outcome, RunOutcome::Applied { .. }));
        assert_eq!(store.apply_call_count(), 1);
    }

    // Second run against the post-apply zone
    {
        let (runner, _events) = SyncRunner::new(
            Box::new(FixedIpResolver::new(ip(5, 6, 7, 8))),
            Box::new(CountingZoneStore::sharing_counters_with(&store)),
            &config,
        )
        .expect("runner construction succeeds");

        let outcome = runner.run().await.expect("second run succeeds");
        assert_eq!(outcome, RunOutcome::Unchanged);
        assert_eq!(
            store.apply_call_count(),
            1,
            "Second run must not submit another change"
        );
    }

    let records = zone.records(ZONE).await.unwrap();
    assert!(records.contains(&ExistingRecord::a("unrelated.example.com.", "1.2.3.4", 900)));
    assert!(records.contains(&ExistingRecord::a("b.example.com.", "5.6.7.8", 900)));
    assert!(records.contains(&ExistingRecord::a("c.example.com.", "5.6.7.8", 300)));
}

#[tokio::test]
async fn ip_change_between_runs_triggers_update() {
    let zone = MemoryZoneStore::with_zone(ZONE, vec![]);
    let config = config_for(&["home.example.com"]);

    for address in [ip(5, 6, 7, 8), ip(9, 9, 9, 9)] {
        let (runner, _events) = SyncRunner::new(
            Box::new(FixedIpResolver::new(address)),
            Box::new(zone.clone()),
            &config,
        )
        .expect("runner construction succeeds");

        runner.run().await.expect("run succeeds");
    }

    assert_eq!(
        zone.records(ZONE).await.unwrap(),
        vec![ExistingRecord::a("home.example.com.", "9.9.9.9", 300)]
    );
    assert_eq!(zone.applied_changes().await.len(), 2);
}
