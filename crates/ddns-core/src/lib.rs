// # ddns-core
//
// Core library for keeping DNS address records pointed at this host.
//
// ## Architecture Overview
//
// This library provides the core functionality for one reconciliation run:
// - **IpResolver**: Trait for discovering the host's external IPv4 address
// - **ZoneRecordStore**: Trait for listing and atomically changing a zone's records
// - **reconcile**: Pure function computing the deletions and additions a zone needs
// - **SyncRunner**: Orchestrates resolve → list → reconcile → apply
// - **MemoryZoneStore**: In-process zone with the provider's change semantics
//
// ## Design Principles
//
// 1. **Pure Core**: The decision logic does no I/O and is tested without a network
// 2. **Collaborators Passed In**: Resolver and store are constructed by the caller, never global
// 3. **Atomic Writes**: One batched change per run, all-or-nothing
// 4. **Library-First**: The binary is a thin wiring layer
// 5. **Idempotency**: Re-running against an up-to-date zone writes nothing

pub mod config;
pub mod error;
pub mod reconcile;
pub mod records;
pub mod runner;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use reconcile::{reconcile, reconcile_with_ttl};
pub use records::{ChangeSet, DEFAULT_TTL, ExistingRecord, NewRecordSpec, RecordType};
pub use runner::{RunEvent, RunOutcome, SyncRunner};
pub use store::MemoryZoneStore;
pub use traits::{ChangeReceipt, IpResolver, ZoneRecordStore};
