// # Zone Record Store Implementations
//
// This module provides in-process implementations of the ZoneRecordStore
// trait. Remote providers live in their own crates.

pub mod memory;

pub use memory::MemoryZoneStore;
