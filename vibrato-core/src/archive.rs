//! Strategy and run archiving
//!
//! Plans are written once per planning run, keyed by generation timestamp.
//! The run record (plan plus execution report) goes under the same
//! timestamp once the sequencer finishes.

use alloc::vec::Vec;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::plan::Strategy;
use crate::sequencer::ExecutionReport;
use crate::traits::{PlanKey, PlanStore, StoreError};

/// Encoding used for archived records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    /// JSON document, readable by reporting tools
    #[default]
    Json,
    /// Compact postcard binary for flash
    Postcard,
}

/// Plan together with its execution report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub strategy: Strategy,
    pub report: ExecutionReport,
}

/// Encode a record
pub fn encode<T: Serialize>(value: &T, format: ArchiveFormat) -> Result<Vec<u8>, StoreError> {
    match format {
        ArchiveFormat::Json => serde_json::to_vec(value).map_err(|_| StoreError::Encode),
        ArchiveFormat::Postcard => postcard::to_allocvec(value).map_err(|_| StoreError::Encode),
    }
}

/// Decode a record
pub fn decode<T: DeserializeOwned>(bytes: &[u8], format: ArchiveFormat) -> Result<T, StoreError> {
    match format {
        ArchiveFormat::Json => serde_json::from_slice(bytes).map_err(|_| StoreError::Decode),
        ArchiveFormat::Postcard => postcard::from_bytes(bytes).map_err(|_| StoreError::Decode),
    }
}

async fn write_once<S: PlanStore, T: Serialize>(
    store: &mut S,
    key: PlanKey,
    value: &T,
    format: ArchiveFormat,
) -> Result<PlanKey, StoreError> {
    if store.exists(key).await {
        return Err(StoreError::Occupied);
    }
    let bytes = encode(value, format)?;
    store.write(key, &bytes).await?;

    #[cfg(feature = "defmt")]
    defmt::info!("Archived {} ({} bytes)", key, bytes.len());

    Ok(key)
}

/// Archive a freshly generated plan
pub async fn archive_strategy<S: PlanStore>(
    store: &mut S,
    timestamp_s: u32,
    strategy: &Strategy,
    format: ArchiveFormat,
) -> Result<PlanKey, StoreError> {
    write_once(store, PlanKey::strategy(timestamp_s), strategy, format).await
}

/// Archive a finished run
pub async fn archive_run<S: PlanStore>(
    store: &mut S,
    timestamp_s: u32,
    record: &RunRecord,
    format: ArchiveFormat,
) -> Result<PlanKey, StoreError> {
    write_once(store, PlanKey::run(timestamp_s), record, format).await
}

/// Load a plan archived at `timestamp_s`
///
/// `buffer` must hold the encoded record. Plans that violate the document
/// invariants are rejected as undecodable.
pub async fn load_strategy<S: PlanStore>(
    store: &mut S,
    timestamp_s: u32,
    format: ArchiveFormat,
    buffer: &mut [u8],
) -> Result<Strategy, StoreError> {
    let len = store.read(PlanKey::strategy(timestamp_s), buffer).await?;
    let strategy: Strategy = decode(&buffer[..len], format)?;
    if !strategy.is_consistent() {
        return Err(StoreError::Decode);
    }
    Ok(strategy)
}

/// Load a run record archived at `timestamp_s`
pub async fn load_run<S: PlanStore>(
    store: &mut S,
    timestamp_s: u32,
    format: ArchiveFormat,
    buffer: &mut [u8],
) -> Result<RunRecord, StoreError> {
    let len = store.read(PlanKey::run(timestamp_s), buffer).await?;
    decode(&buffer[..len], format)
}
