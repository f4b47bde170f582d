//! Collaborator traits for the DDNS reconciler
//!
//! This module defines the abstract interfaces the runner talks to.
//!
//! - [`IpResolver`]: Discover the host's external IPv4 address
//! - [`ZoneRecordStore`]: List and atomically change a zone's records

pub mod ip_resolver;
pub mod zone_store;

pub use ip_resolver::IpResolver;
pub use zone_store::{ChangeReceipt, ZoneRecordStore};
