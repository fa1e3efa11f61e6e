//! Execution report
//!
//! One entry per visited point. Points beyond the cap or after a stop are
//! absent, not listed as skipped.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::traits::{ActuatorError, Direction};

/// How a point ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    /// Full vibration time delivered
    Completed,
    /// Actuator fault; the run moved on
    Failed,
    /// Stop requested while the point was in progress
    Aborted,
}

/// Error recorded against a single point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum PointFault {
    Actuator(ActuatorError),
}

/// Clock readings (ms) at each phase entry of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTimestamps {
    pub approach_ms: Option<u64>,
    pub ready_ms: Option<u64>,
    pub active_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    pub finished_ms: Option<u64>,
}

/// Log entry for one visited point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointLog {
    pub id: u32,
    pub direction: Direction,
    pub status: PointStatus,
    pub phase_timestamps: PhaseTimestamps,
    /// Step patterns delivered during ACTIVE
    pub steps: u32,
    pub error: Option<PointFault>,
}

/// Overall run result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every capped point completed
    Completed,
    /// Reached the end, but some points failed
    CompletedWithFailures,
    /// Stopped early on request
    Aborted,
}

/// Report of one sequencer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcome: RunOutcome,
    /// Points the run intended to visit: `min(cap, total_points)`
    pub planned_points: usize,
    pub point_cap: usize,
    pub entries: Vec<PointLog>,
    pub finished_ms: u64,
}

impl ExecutionReport {
    pub fn completed(&self) -> usize {
        self.count(PointStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(PointStatus::Failed)
    }

    fn count(&self, status: PointStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Ids of points that failed
    pub fn failed_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter(|e| e.status == PointStatus::Failed)
            .map(|e| e.id)
    }
}
