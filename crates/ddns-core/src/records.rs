//! Record shapes exchanged with a managed DNS zone
//!
//! Reading and writing use two distinct shapes: [`ExistingRecord`] is a
//! read-only snapshot returned by a listing, [`NewRecordSpec`] is the
//! intent to create a record. A modification is always a deletion of the
//! exact existing record plus an addition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// TTL given to records created for names that had no address record
pub const DEFAULT_TTL: u32 = 300;

/// DNS record type as reported by the zone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    Cname,
    Mx,
    Ns,
    Soa,
    Txt,
    /// Any type this crate has no use for
    Other(String),
}

impl RecordType {
    /// Upper-case wire name of the type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Soa => "SOA",
            RecordType::Txt => "TXT",
            RecordType::Other(name) => name,
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "SOA" => RecordType::Soa,
            "TXT" => RecordType::Txt,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordType::from(raw.as_str()))
    }
}

/// A record currently present in the zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Fully-qualified name as reported by the zone
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record data values (addresses for `A` records)
    pub rrdatas: Vec<String>,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl ExistingRecord {
    /// Build a single-value `A` record
    pub fn a(name: impl Into<String>, address: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::A,
            rrdatas: vec![address.into()],
            ttl,
        }
    }

    pub fn is_address_record(&self) -> bool {
        self.record_type == RecordType::A
    }

    /// Address values joined for log output
    pub fn addresses(&self) -> String {
        self.rrdatas.join(",")
    }
}

/// A record to be created in the zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecordSpec {
    /// Fully-qualified name (trailing dot)
    pub name: String,
    /// The address the record points at
    pub address: Ipv4Addr,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl NewRecordSpec {
    pub fn new(name: impl Into<String>, address: Ipv4Addr, ttl: u32) -> Self {
        Self {
            name: name.into(),
            address,
            ttl,
        }
    }

    /// The record as it will appear in a later listing
    pub fn to_existing(&self) -> ExistingRecord {
        ExistingRecord::a(self.name.clone(), self.address.to_string(), self.ttl)
    }
}

/// Deletions and additions that bring a zone in line with the desired state
///
/// Created fresh for each run and consumed by a single atomic apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Exact existing records to remove
    pub deletions: Vec<ExistingRecord>,
    /// Records to create
    pub additions: Vec<NewRecordSpec>,
}

impl ChangeSet {
    /// True when applying the change would be a no-op
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.additions.is_empty()
    }

    /// Total number of record operations
    pub fn len(&self) -> usize {
        self.deletions.len() + self.additions.len()
    }
}

/// Canonical form of a DNS name: lower-case with a trailing dot
///
/// Managed zones report fully-qualified names with the root dot, while
/// configured names are usually written without it.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.').to_ascii_lowercase();
    format!("{trimmed}.")
}
