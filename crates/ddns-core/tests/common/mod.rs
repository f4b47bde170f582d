//! Test doubles and common utilities for run contract tests
//!
//! These doubles count calls so tests can assert which collaborator steps
//! ran, and can inject failures at each step.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::records::{ChangeSet, ExistingRecord};
use ddns_core::store::MemoryZoneStore;
use ddns_core::traits::{ChangeReceipt, IpResolver, ZoneRecordStore};
use ddns_core::SyncConfig;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ZONE: &str = "home-zone";

/// An IpResolver that always answers the same address
pub struct FixedIpResolver {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpResolver {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times external_ipv4() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new FixedIpResolver that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for FixedIpResolver {
    async fn external_ipv4(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "fixed"
    }
}

/// An IpResolver whose lookup always fails
pub struct FailingIpResolver;

#[async_trait::async_trait]
impl IpResolver for FailingIpResolver {
    async fn external_ipv4(&self) -> Result<Ipv4Addr> {
        Err(Error::ip_resolution("every lookup service failed"))
    }

    fn resolver_name(&self) -> &'static str {
        "failing"
    }
}

/// Which step of a zone store should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    List,
    Apply,
}

/// A ZoneRecordStore over a MemoryZoneStore that tracks calls
pub struct CountingZoneStore {
    inner: MemoryZoneStore,
    fail_at: FailAt,
    list_call_count: Arc<AtomicUsize>,
    apply_call_count: Arc<AtomicUsize>,
}

impl CountingZoneStore {
    pub fn new(inner: MemoryZoneStore) -> Self {
        Self {
            inner,
            fail_at: FailAt::Nothing,
            list_call_count: Arc::new(AtomicUsize::new(0)),
            apply_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times apply_change() was called
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// Create a new CountingZoneStore that shares zone and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            fail_at: other.fail_at,
            list_call_count: Arc::clone(&other.list_call_count),
            apply_call_count: Arc::clone(&other.apply_call_count),
        }
    }
}

#[async_trait::async_trait]
impl ZoneRecordStore for CountingZoneStore {
    async fn list_records(&self, zone: &str) -> Result<Vec<ExistingRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::List {
            return Err(Error::auth("invalid service account"));
        }
        self.inner.list_records(zone).await
    }

    async fn apply_change(&self, zone: &str, change: &ChangeSet) -> Result<ChangeReceipt> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Apply {
            return Err(Error::provider("counting", "change rejected"));
        }
        self.inner.apply_change(zone, change).await
    }

    fn store_name(&self) -> &'static str {
        "counting"
    }
}

/// Helper to create a valid SyncConfig for testing
pub fn config_for(names: &[&str]) -> SyncConfig {
    SyncConfig::new(
        "test-project",
        ZONE,
        names.iter().map(|name| name.to_string()).collect(),
    )
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
