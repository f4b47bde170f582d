// # Zone Record Store Trait
//
// Defines the interface for reading and writing a managed DNS zone.
//
// ## Implementations
//
// - Google Cloud DNS: `ddns-provider-gcloud` crate
// - In-memory: [`crate::store::MemoryZoneStore`]
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{ZoneRecordStore, reconcile};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* ZoneRecordStore implementation */;
//
//     let records = store.list_records("home-zone").await?;
//     let change = reconcile(&desired, ip, &records);
//     if !change.is_empty() {
//         store.apply_change("home-zone", &change).await?;
//     }
//
//     Ok(())
// }
// ```

use crate::records::{ChangeSet, ExistingRecord};
use async_trait::async_trait;

/// Acknowledgement of a submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReceipt {
    /// Provider-assigned change id, if the provider has one
    pub id: Option<String>,
    /// Provider-reported status (e.g. "pending", "done")
    pub status: String,
}

impl ChangeReceipt {
    pub fn new(id: Option<String>, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
        }
    }
}

/// Trait for zone record store implementations
///
/// # Atomicity
///
/// `apply_change` must be all-or-nothing: either every deletion and every
/// addition in the change set takes effect, or none does. A failed apply
/// leaves the zone in its pre-run state.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the provider's endpoints only
/// - ✅ Cache an access token for the lifetime of the store
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide which records change (owned by [`crate::reconcile`])
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait ZoneRecordStore: Send + Sync {
    /// List every record currently in the zone
    ///
    /// # Parameters
    ///
    /// - `zone`: The managed zone name (provider identifier, not the DNS suffix)
    async fn list_records(&self, zone: &str) -> Result<Vec<ExistingRecord>, crate::Error>;

    /// Apply deletions and additions as one atomic change
    ///
    /// # Parameters
    ///
    /// - `zone`: The managed zone name
    /// - `change`: Exact records to delete and records to add
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeReceipt)`: The change was accepted
    /// - `Err(Error)`: The change was rejected and nothing was written
    async fn apply_change(
        &self,
        zone: &str,
        change: &ChangeSet,
    ) -> Result<ChangeReceipt, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
