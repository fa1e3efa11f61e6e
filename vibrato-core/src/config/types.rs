//! Configuration type definitions
//!
//! Every section has working defaults, so a TOML file only needs the keys
//! that differ from the reference machine.

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveFormat;
use crate::plan::SlabGeometry;
use crate::traits::Polarity;

/// Execution sequencer timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SequencerConfig {
    /// Maximum points executed per run
    pub point_cap: usize,
    /// Travel dwell before each point (ms)
    pub approach_ms: u32,
    /// Ready lamp dwell before vibrating (ms)
    pub ready_ms: u32,
    /// Withdrawal dwell after vibrating (ms)
    pub settle_ms: u32,
    /// Ready lamp flash after the last point (ms), 0 to skip
    pub completion_flash_ms: u32,
    /// Longest blocking wait between stop-flag polls during dwells (ms)
    pub poll_slice_ms: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            point_cap: 5,
            approach_ms: 3000,
            ready_ms: 3000,
            settle_ms: 1000,
            completion_flash_ms: 3000,
            poll_slice_ms: 100,
        }
    }
}

/// Probe drive parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct StepperConfig {
    /// Steps per output shaft revolution (28BYJ-48: 2048)
    pub steps_per_revolution: u16,
    pub min_rpm: u16,
    pub max_rpm: u16,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 2048,
            min_rpm: 5,
            max_rpm: 30,
        }
    }
}

/// Indicator and alarm wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SignalConfig {
    pub ready_polarity: Polarity,
    pub active_polarity: Polarity,
    pub alarm_polarity: Polarity,
    /// Alarm buzzer is wired to the active lamp's line
    pub shared_alarm: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ready_polarity: Polarity::ActiveHigh,
            active_polarity: Polarity::ActiveLow,
            alarm_polarity: Polarity::ActiveLow,
            shared_alarm: false,
        }
    }
}

/// Planner defaults used when the operator gives no value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct PlannerConfig {
    pub power_kw: f64,
    pub width_m: f64,
    pub length_m: f64,
    pub thickness_cm: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let slab = SlabGeometry::default();
        Self {
            power_kw: crate::plan::inputs::DEFAULT_POWER_KW,
            width_m: slab.width_m,
            length_m: slab.length_m,
            thickness_cm: slab.thickness_cm,
        }
    }
}

impl PlannerConfig {
    /// Default slab for this machine
    pub fn geometry(&self) -> SlabGeometry {
        SlabGeometry::new(self.width_m, self.length_m, self.thickness_cm)
    }
}

/// Plan archive settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ArchiveConfig {
    pub format: ArchiveFormat,
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct MachineConfig {
    pub sequencer: SequencerConfig,
    pub stepper: StepperConfig,
    pub signals: SignalConfig,
    pub planner: PlannerConfig,
    pub archive: ArchiveConfig,
}
