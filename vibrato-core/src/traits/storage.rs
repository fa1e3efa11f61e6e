//! Plan storage abstractions
//!
//! Persistent key-value storage for generated strategies and run records.
//! Records are keyed by generation timestamp and written once.

use serde::{Deserialize, Serialize};

/// Kind of record stored under a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordKind {
    /// Generated strategy document
    Strategy,
    /// Strategy plus execution report
    Run,
}

/// Storage key: generation timestamp plus record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanKey {
    /// Generation time (seconds since the epoch used by the host clock)
    pub timestamp_s: u32,
    /// What is stored under this key
    pub kind: RecordKind,
}

impl PlanKey {
    /// Key for a strategy generated at `timestamp_s`
    pub const fn strategy(timestamp_s: u32) -> Self {
        Self {
            timestamp_s,
            kind: RecordKind::Strategy,
        }
    }

    /// Key for the run record of the strategy generated at `timestamp_s`
    pub const fn run(timestamp_s: u32) -> Self {
        Self {
            timestamp_s,
            kind: RecordKind::Run,
        }
    }
}

/// Errors from plan storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// A record already exists under this key
    Occupied,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
    /// Record could not be encoded
    Encode,
    /// Stored bytes could not be decoded
    Decode,
}

/// Plan storage trait
///
/// Implementations may be backed by flash (wear-leveled map), a file
/// system, or memory.
pub trait PlanStore {
    /// Read a record into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: PlanKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StoreError>>;

    /// Write a record
    fn write(
        &mut self,
        key: PlanKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: PlanKey) -> impl core::future::Future<Output = bool>;

    /// Erase all stored records
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), StoreError>>;
}
