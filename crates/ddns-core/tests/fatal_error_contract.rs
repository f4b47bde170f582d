//! Run Contract Test: Fatal Errors
//!
//! Every step of a run is fatal on failure and later steps never run.
//!
//! Constraints verified:
//! - An IP resolution failure aborts before the zone is read
//! - A listing failure aborts before anything is written
//! - A rejected change leaves the zone exactly as it was
//! - Nothing is retried within a run
//!
//! If this test fails, a broken run could write a partial or stale change.

mod common;

use common::*;
use ddns_core::records::ExistingRecord;
use ddns_core::store::MemoryZoneStore;
use ddns_core::{Error, RunEvent, SyncRunner};

fn stale_zone() -> MemoryZoneStore {
    MemoryZoneStore::with_zone(
        ZONE,
        vec![ExistingRecord::a("a.example.com.", "1.2.3.4", 600)],
    )
}

#[tokio::test]
async fn ip_resolution_failure_stops_before_listing() {
    let store = CountingZoneStore::new(stale_zone());

    let (runner, _events) = SyncRunner::new(
        Box::new(FailingIpResolver),
        Box::new(CountingZoneStore::sharing_counters_with(&store)),
        &config_for(&["a.example.com"]),
    )
    .expect("runner construction succeeds");

    let err = runner.run().await.expect_err("run must fail");

    assert!(matches!(err, Error::IpResolution(_)), "got {err}");
    assert_eq!(store.list_call_count(), 0, "Zone must not be read");
    assert_eq!(store.apply_call_count(), 0, "Zone must not be written");
}

#[tokio::test]
async fn listing_failure_stops_before_apply() {
    let resolver = FixedIpResolver::new(ip(5, 6, 7, 8));
    let store = CountingZoneStore::new(stale_zone()).failing_at(FailAt::List);

    let (runner, _events) = SyncRunner::new(
        Box::new(FixedIpResolver::sharing_counters_with(&resolver)),
        Box::new(CountingZoneStore::sharing_counters_with(&store)),
        &config_for(&["a.example.com"]),
    )
    .expect("runner construction succeeds");

    let err = runner.run().await.expect_err("run must fail");

    assert!(
        matches!(err, Error::ZoneRead { ref zone, .. } if zone == ZONE),
        "got {err}"
    );
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(store.list_call_count(), 1, "Listing must not be retried");
    assert_eq!(store.apply_call_count(), 0);
}

#[tokio::test]
async fn rejected_change_leaves_zone_untouched() {
    let zone = stale_zone();
    let store = CountingZoneStore::new(zone.clone()).failing_at(FailAt::Apply);

    let (runner, mut events) = SyncRunner::new(
        Box::new(FixedIpResolver::new(ip(5, 6, 7, 8))),
        Box::new(CountingZoneStore::sharing_counters_with(&store)),
        &config_for(&["a.example.com", "b.example.com"]),
    )
    .expect("runner construction succeeds");

    let err = runner.run().await.expect_err("run must fail");
    drop(runner);

    assert!(matches!(err, Error::ZoneWrite { .. }), "got {err}");
    assert_eq!(store.apply_call_count(), 1, "Apply must not be retried");
    assert_eq!(
        zone.records(ZONE).await.unwrap(),
        vec![ExistingRecord::a("a.example.com.", "1.2.3.4", 600)]
    );

    let mut last = None;
    while let Some(event) = events.recv().await {
        assert!(!matches!(event, RunEvent::ChangeApplied { .. }));
        last = Some(event);
    }
    assert!(matches!(last, Some(RunEvent::Failed { .. })));
}

#[tokio::test]
async fn missing_zone_is_a_read_error() {
    let (runner, _events) = SyncRunner::new(
        Box::new(FixedIpResolver::new(ip(5, 6, 7, 8))),
        Box::new(MemoryZoneStore::new()),
        &config_for(&["a.example.com"]),
    )
    .expect("runner construction succeeds");

    let err = runner.run().await.expect_err("run must fail");

    match err {
        Error::ZoneRead { source, .. } => assert!(matches!(*source, Error::NotFound(_))),
        other => panic!("expected ZoneRead, got {other}"),
    }
}
