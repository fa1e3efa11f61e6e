//! Coil actuator trait
//!
//! This trait abstracts over the probe drive. The reference hardware is a
//! unipolar stepper (28BYJ-48 behind a ULN2003 array) where each step is a
//! pattern of energized coils.

use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Clockwise rotation
    Clockwise,
    /// Counter-clockwise rotation
    CounterClockwise,
}

impl Direction {
    /// Rotation sense for the point at `index` in execution order
    ///
    /// Even indices turn clockwise, odd indices counter-clockwise, so the
    /// probe cable unwinds on every other point.
    pub fn for_point(index: usize) -> Self {
        if index % 2 == 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}

/// Coil energization pattern for one step
///
/// Bit `i` set means coil `i` is energized. The default is all coils off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepPattern(u8);

impl StepPattern {
    /// All coils released
    pub const OFF: StepPattern = StepPattern(0);

    /// Number of coil lines a pattern addresses
    pub const COILS: usize = 4;

    /// Create a pattern from a coil mask (upper bits are ignored)
    pub const fn new(mask: u8) -> Self {
        Self(mask & 0x0F)
    }

    /// Raw coil mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether coil `index` is energized in this pattern
    pub const fn coil(self, index: usize) -> bool {
        index < Self::COILS && (self.0 >> index) & 1 == 1
    }

    /// Whether any coil is energized
    pub const fn is_energized(self) -> bool {
        self.0 != 0
    }
}

/// Errors that can occur with actuator operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ActuatorError {
    /// Step requested before `init`
    NotInitialized,
    /// A coil output could not be driven
    Pin,
    /// Drive reported a mechanical stall
    Stalled,
}

/// Trait for the probe drive
///
/// All methods must be idempotent and safe to call while de-energized.
pub trait CoilActuator {
    /// Prepare the outputs (all coils released)
    fn init(&mut self) -> Result<(), ActuatorError>;

    /// Apply one step pattern, writing each coil line in index order
    fn step(&mut self, pattern: StepPattern) -> Result<(), ActuatorError>;

    /// Release every coil
    ///
    /// Must leave the drive de-energized even if individual writes fail.
    fn shutdown(&mut self);

    /// Check if any coil is currently energized
    fn is_energized(&self) -> bool;
}
