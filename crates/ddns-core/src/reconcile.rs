//! Reconciliation of a zone's address records with the current IP
//!
//! Pure decision logic: given the desired names, the current external
//! address and a snapshot of the zone, compute the exact deletions and
//! additions needed. No I/O happens here.
//!
//! ## Rules
//!
//! 1. Only `A` records whose name is desired are of interest.
//! 2. A record of interest holding exactly the current address is left alone.
//! 3. Any other record of interest is deleted and re-added with the current
//!    address, keeping its TTL.
//! 4. A desired name with no `A` record at all is created with the default TTL.
//!
//! When a name has several `A` records each one is handled on its own, so a
//! name can receive more than one addition.

use crate::records::{ChangeSet, DEFAULT_TTL, ExistingRecord, NewRecordSpec, normalize_name};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// Compute the change set using [`DEFAULT_TTL`] for created records
///
/// `desired` names may be written with or without the trailing root dot;
/// comparison with the zone's names is case-insensitive.
pub fn reconcile(
    desired: &BTreeSet<String>,
    current_ip: Ipv4Addr,
    existing: &[ExistingRecord],
) -> ChangeSet {
    reconcile_with_ttl(desired, current_ip, existing, DEFAULT_TTL)
}

/// Compute the change set with an explicit TTL for created records
pub fn reconcile_with_ttl(
    desired: &BTreeSet<String>,
    current_ip: Ipv4Addr,
    existing: &[ExistingRecord],
    default_ttl: u32,
) -> ChangeSet {
    let wanted: BTreeSet<String> = desired.iter().map(|name| normalize_name(name)).collect();

    let records_of_interest: Vec<&ExistingRecord> = existing
        .iter()
        .filter(|record| {
            record.is_address_record() && wanted.contains(&normalize_name(&record.name))
        })
        .collect();

    let mut change = ChangeSet::default();

    for record in records_of_interest.iter().copied() {
        if is_up_to_date(record, current_ip) {
            continue;
        }

        change.deletions.push(record.clone());
        change
            .additions
            .push(NewRecordSpec::new(record.name.clone(), current_ip, record.ttl));
    }

    let present: BTreeSet<String> = records_of_interest
        .iter()
        .map(|record| normalize_name(&record.name))
        .collect();

    change.additions.extend(
        wanted
            .difference(&present)
            .map(|name| NewRecordSpec::new(name.clone(), current_ip, default_ttl)),
    );

    change
}

/// A record is current when its only value is the current address
fn is_up_to_date(record: &ExistingRecord, current_ip: Ipv4Addr) -> bool {
    match record.rrdatas.as_slice() {
        [only] => only.trim().parse::<Ipv4Addr>().ok() == Some(current_ip),
        _ => false,
    }
}
