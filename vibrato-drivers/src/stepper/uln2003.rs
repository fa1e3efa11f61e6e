//! ULN2003 unipolar stepper drive
//!
//! Four GPIO lines feed a ULN2003 Darlington array, which sinks the coils
//! of a 28BYJ-48 geared stepper. A high input energizes the coil, so the
//! lines are driven straight from the step pattern bits.

use embedded_hal::digital::OutputPin;
use vibrato_core::traits::{ActuatorError, CoilActuator, StepPattern};

/// Probe drive on four coil lines (IN1..IN4)
pub struct Uln2003Stepper<P> {
    coils: [P; StepPattern::COILS],
    /// Bit `i` set while coil `i` was last driven high
    driven: u8,
    initialized: bool,
}

impl<P: OutputPin> Uln2003Stepper<P> {
    /// Create a drive from the IN1..IN4 pins
    ///
    /// The pins are not touched until [`CoilActuator::init`].
    pub fn new(coils: [P; StepPattern::COILS]) -> Self {
        Self {
            coils,
            driven: 0,
            initialized: false,
        }
    }

    /// Release the coils and hand the pins back
    pub fn release(mut self) -> [P; StepPattern::COILS] {
        self.shutdown();
        self.coils
    }

    /// Coil mask as last driven
    pub fn driven(&self) -> StepPattern {
        StepPattern::new(self.driven)
    }

    fn write_coil(&mut self, index: usize, energized: bool) -> Result<(), ActuatorError> {
        let pin = &mut self.coils[index];
        let result = if energized {
            pin.set_high()
        } else {
            pin.set_low()
        };
        result.map_err(|_| ActuatorError::Pin)?;

        if energized {
            self.driven |= 1 << index;
        } else {
            self.driven &= !(1 << index);
        }
        Ok(())
    }
}

impl<P: OutputPin> CoilActuator for Uln2003Stepper<P> {
    fn init(&mut self) -> Result<(), ActuatorError> {
        // Coils may be in any state after reset
        self.driven = 0x0F;
        for index in 0..StepPattern::COILS {
            self.write_coil(index, false)?;
        }
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("ULN2003 drive initialized");

        Ok(())
    }

    fn step(&mut self, pattern: StepPattern) -> Result<(), ActuatorError> {
        if !self.initialized {
            return Err(ActuatorError::NotInitialized);
        }
        for index in 0..StepPattern::COILS {
            self.write_coil(index, pattern.coil(index))?;
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        for index in 0..StepPattern::COILS {
            // Keep going so one stuck line doesn't leave the others energized
            if self.write_coil(index, false).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Coil {} did not release", index);
            }
        }
    }

    fn is_energized(&self) -> bool {
        self.driven != 0
    }
}
