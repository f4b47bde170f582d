//! One-shot reconciliation runner
//!
//! The SyncRunner is responsible for:
//! - Resolving the current external IP via IpResolver
//! - Listing the zone's records via ZoneRecordStore
//! - Computing the change set with the reconciler
//! - Submitting the change as one atomic batch
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   Ipv4Addr   ┌──────────────┐   records   ┌─────────────────┐
//! │ IpResolver  │─────────────▶│  SyncRunner  │◀────────────│ ZoneRecordStore │
//! └─────────────┘              └──────────────┘             │   (list)        │
//!                                      │                    └─────────────────┘
//!                                      ▼
//!                              ┌──────────────┐  ChangeSet  ┌─────────────────┐
//!                              │  reconcile   │────────────▶│ ZoneRecordStore │
//!                              └──────────────┘             │   (apply)       │
//!                                                           └─────────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Resolve the external IP
//! 2. List the zone's records
//! 3. Reconcile desired names against the listing
//! 4. If the change set is empty, stop (no write)
//! 5. Log every deletion and addition, then apply the change
//!
//! Every step depends on the previous one and any failure ends the run.
//! Retrying is left to whatever schedules the job.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::reconcile::reconcile_with_ttl;
use crate::records::ChangeSet;
use crate::traits::{ChangeReceipt, IpResolver, ZoneRecordStore};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the run event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by the SyncRunner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Run started
    Started { zone: String, names_count: usize },

    /// External IP resolved
    IpResolved { ip: Ipv4Addr },

    /// Zone listing fetched
    RecordsListed { total: usize },

    /// A record is about to be deleted
    RecordRemoving {
        name: String,
        addresses: String,
        ttl: u32,
    },

    /// A record is about to be added
    RecordAdding {
        name: String,
        address: Ipv4Addr,
        ttl: u32,
    },

    /// Zone already up to date, nothing written
    NoChanges,

    /// Change accepted by the store
    ChangeApplied {
        deleted: usize,
        added: usize,
        change_id: Option<String>,
    },

    /// Run aborted
    Failed { error: String },
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every desired name already pointed at the current IP
    Unchanged,

    /// A change was submitted
    Applied {
        change: ChangeSet,
        receipt: ChangeReceipt,
    },
}

/// One-shot reconciliation runner
///
/// Collaborators are constructed once by the caller and handed in; the
/// runner owns them for the duration of the run.
///
/// ## Lifecycle
///
/// 1. Create with [`SyncRunner::new()`]
/// 2. Execute once with [`SyncRunner::run()`]
/// 3. Drop
pub struct SyncRunner {
    /// Resolver for the external IP
    resolver: Box<dyn IpResolver>,

    /// Store for the managed zone
    store: Box<dyn ZoneRecordStore>,

    /// Managed zone name
    zone: String,

    /// Desired names in canonical form
    desired: BTreeSet<String>,

    /// TTL for newly created records
    default_ttl: u32,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<RunEvent>,
}

impl SyncRunner {
    /// Create a new runner
    ///
    /// # Parameters
    ///
    /// - `resolver`: IP resolver implementation
    /// - `store`: Zone record store implementation
    /// - `config`: Run configuration (validated here)
    ///
    /// # Returns
    ///
    /// A tuple of (runner, event_receiver) where event_receiver yields run events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        store: Box<dyn ZoneRecordStore>,
        config: &SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<RunEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let runner = Self {
            resolver,
            store,
            zone: config.zone_name.clone(),
            desired: config.desired_names(),
            default_ttl: config.default_ttl,
            event_tx: tx,
        };

        Ok((runner, rx))
    }

    /// Execute one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome)`: The zone is in line with the desired state
    /// - `Err(Error)`: The run aborted; if the failure happened while
    ///   applying, the zone is unchanged
    pub async fn run(&self) -> Result<RunOutcome> {
        match self.run_internal().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Reconciliation of zone {} failed: {}", self.zone, e);
                self.emit_event(RunEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_internal(&self) -> Result<RunOutcome> {
        self.emit_event(RunEvent::Started {
            zone: self.zone.clone(),
            names_count: self.desired.len(),
        });

        let ip = self.resolve_ip().await?;
        info!("External IP of this host was detected: {}", ip);
        self.emit_event(RunEvent::IpResolved { ip });

        let records = self
            .store
            .list_records(&self.zone)
            .await
            .map_err(|e| Error::zone_read(&self.zone, e))?;
        debug!(
            "Listed {} record(s) in zone {} via {}",
            records.len(),
            self.zone,
            self.store.store_name()
        );
        self.emit_event(RunEvent::RecordsListed {
            total: records.len(),
        });

        let change = reconcile_with_ttl(&self.desired, ip, &records, self.default_ttl);

        if change.is_empty() {
            info!("No records to modify");
            self.emit_event(RunEvent::NoChanges);
            return Ok(RunOutcome::Unchanged);
        }

        for record in &change.deletions {
            info!(
                "Removing record: {} | {} | {}",
                record.name,
                record.addresses(),
                record.ttl
            );
            self.emit_event(RunEvent::RecordRemoving {
                name: record.name.clone(),
                addresses: record.addresses(),
                ttl: record.ttl,
            });
        }

        for record in &change.additions {
            info!(
                "Adding record: {} | {} | {}",
                record.name, record.address, record.ttl
            );
            self.emit_event(RunEvent::RecordAdding {
                name: record.name.clone(),
                address: record.address,
                ttl: record.ttl,
            });
        }

        let receipt = self
            .store
            .apply_change(&self.zone, &change)
            .await
            .map_err(|e| Error::zone_write(&self.zone, e))?;

        info!(
            "Change completed (id: {}, status: {})",
            receipt.id.as_deref().unwrap_or("-"),
            receipt.status
        );
        self.emit_event(RunEvent::ChangeApplied {
            deleted: change.deletions.len(),
            added: change.additions.len(),
            change_id: receipt.id.clone(),
        });

        Ok(RunOutcome::Applied { change, receipt })
    }

    /// Resolve the external IP, classifying any failure as an IP resolution error
    async fn resolve_ip(&self) -> Result<Ipv4Addr> {
        self.resolver.external_ipv4().await.map_err(|e| match e {
            Error::IpResolution(_) => e,
            other => Error::ip_resolution(format!(
                "{} resolver failed: {}",
                self.resolver.resolver_name(),
                other
            )),
        })
    }

    /// Emit a run event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: RunEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            // Nobody is listening; events are optional
            Err(mpsc::error::TrySendError::Closed(_)) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
        }
    }
}
