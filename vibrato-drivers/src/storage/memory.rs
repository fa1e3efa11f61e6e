//! RAM-backed plan storage
//!
//! Key-value map with a fixed byte budget, standing in for a flash
//! partition on boards without one and on the host.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use vibrato_core::traits::{PlanKey, PlanStore, StoreError};

/// Byte budget matching a 64KB flash partition
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// In-memory plan store
#[derive(Debug, Clone)]
pub struct MemoryPlanStore {
    records: BTreeMap<PlanKey, Vec<u8>>,
    capacity: usize,
    used: usize,
}

impl Default for MemoryPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlanStore {
    /// Create an empty store with [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            capacity,
            used: 0,
        }
    }

    /// Bytes held by stored records
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored keys in ascending order (oldest timestamp first)
    pub fn keys(&self) -> impl Iterator<Item = PlanKey> + '_ {
        self.records.keys().copied()
    }
}

impl PlanStore for MemoryPlanStore {
    async fn read(&mut self, key: PlanKey, buffer: &mut [u8]) -> Result<usize, StoreError> {
        let data = self.records.get(&key).ok_or(StoreError::NotFound)?;
        let len = data.len();
        if buffer.len() < len {
            return Err(StoreError::BufferTooSmall);
        }
        buffer[..len].copy_from_slice(data);
        Ok(len)
    }

    async fn write(&mut self, key: PlanKey, data: &[u8]) -> Result<(), StoreError> {
        let replaced = self.records.get(&key).map_or(0, Vec::len);
        let used = self.used - replaced + data.len();
        if used > self.capacity {
            return Err(StoreError::Full);
        }

        self.records.insert(key, data.to_vec());
        self.used = used;
        Ok(())
    }

    async fn exists(&mut self, key: PlanKey) -> bool {
        self.records.contains_key(&key)
    }

    async fn erase_all(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        self.used = 0;
        Ok(())
    }
}
