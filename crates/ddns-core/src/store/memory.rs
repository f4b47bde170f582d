// # Memory Zone Store
//
// In-memory implementation of ZoneRecordStore.
//
// ## Purpose
//
// Models a managed zone without a provider: rehearsing a run, embedding
// the reconciler in tests, or checking that a change set converges.
//
// ## Change Semantics
//
// Changes follow the managed-zone model:
// - A deletion must match an existing record exactly (name, type, data, TTL)
// - An addition must not collide with a remaining record of the same name and type
// - Any violation rejects the whole change and leaves the zone untouched

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::records::{ChangeSet, ExistingRecord, normalize_name};
use crate::traits::zone_store::{ChangeReceipt, ZoneRecordStore};

/// In-memory zone store implementation
///
/// Zones are keyed by their managed zone name. Cloning the store shares
/// the underlying zones.
///
/// # Example
///
/// ```rust
/// use ddns_core::store::MemoryZoneStore;
/// use ddns_core::records::ExistingRecord;
/// use ddns_core::traits::ZoneRecordStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryZoneStore::with_zone(
///         "home-zone",
///         vec![ExistingRecord::a("home.example.com.", "1.2.3.4", 300)],
///     );
///
///     let records = store.list_records("home-zone").await?;
///     assert_eq!(records.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneStore {
    zones: Arc<RwLock<HashMap<String, Vec<ExistingRecord>>>>,
    applied: Arc<RwLock<Vec<ChangeSet>>>,
}

impl MemoryZoneStore {
    /// Create a store with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one zone
    pub fn with_zone(zone: impl Into<String>, records: Vec<ExistingRecord>) -> Self {
        let mut zones = HashMap::new();
        zones.insert(zone.into(), records);

        Self {
            zones: Arc::new(RwLock::new(zones)),
            applied: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of a zone's records
    pub async fn records(&self, zone: &str) -> Option<Vec<ExistingRecord>> {
        self.zones.read().await.get(zone).cloned()
    }

    /// Changes accepted so far, in order
    pub async fn applied_changes(&self) -> Vec<ChangeSet> {
        self.applied.read().await.clone()
    }
}

#[async_trait]
impl ZoneRecordStore for MemoryZoneStore {
    async fn list_records(&self, zone: &str) -> Result<Vec<ExistingRecord>, Error> {
        self.zones
            .read()
            .await
            .get(zone)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))
    }

    async fn apply_change(&self, zone: &str, change: &ChangeSet) -> Result<ChangeReceipt, Error> {
        let mut zones = self.zones.write().await;
        let current = zones
            .get(zone)
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))?;

        // Work on a copy so a rejected change leaves the zone as it was
        let mut next = current.clone();

        for deletion in &change.deletions {
            let position = next.iter().position(|record| record == deletion).ok_or_else(|| {
                Error::provider(
                    "memory",
                    format!(
                        "Deletion does not match an existing record: {} {} {} {}",
                        deletion.name,
                        deletion.record_type,
                        deletion.addresses(),
                        deletion.ttl
                    ),
                )
            })?;
            next.remove(position);
        }

        for addition in &change.additions {
            let record = addition.to_existing();
            let name = normalize_name(&record.name);
            let collides = next.iter().any(|existing| {
                existing.record_type == record.record_type && normalize_name(&existing.name) == name
            });
            if collides {
                return Err(Error::provider(
                    "memory",
                    format!("Record already exists: {} {}", record.name, record.record_type),
                ));
            }
            next.push(record);
        }

        zones.insert(zone.to_string(), next);

        let mut applied = self.applied.write().await;
        applied.push(change.clone());

        Ok(ChangeReceipt::new(Some(applied.len().to_string()), "done"))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
