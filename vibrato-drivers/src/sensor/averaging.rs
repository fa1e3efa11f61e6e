//! Averaged temperature readings
//!
//! Single thermistor conversions on an 8-bit converter jitter by a few
//! tenths of a degree. The planner takes one temperature per slab, so the
//! reading is averaged over several samples spaced by a short delay.

use embedded_hal::delay::DelayNs;
use vibrato_core::traits::{SensorError, TemperatureSensor};

/// Samples per reading on the reference panel
pub const DEFAULT_SAMPLES: u8 = 10;

/// Delay between samples (ms)
pub const DEFAULT_INTERVAL_MS: u32 = 500;

/// Wraps a sensor and reports the mean of several samples
pub struct AveragingSensor<S, D> {
    sensor: S,
    delay: D,
    samples: u8,
    interval_ms: u32,
}

impl<S: TemperatureSensor, D: DelayNs> AveragingSensor<S, D> {
    /// Average [`DEFAULT_SAMPLES`] samples, [`DEFAULT_INTERVAL_MS`] apart
    pub fn new(sensor: S, delay: D) -> Self {
        Self::with_samples(sensor, delay, DEFAULT_SAMPLES, DEFAULT_INTERVAL_MS)
    }

    /// Custom sample count (at least one) and spacing
    pub fn with_samples(sensor: S, delay: D, samples: u8, interval_ms: u32) -> Self {
        Self {
            sensor,
            delay,
            samples: samples.max(1),
            interval_ms,
        }
    }

    pub fn into_inner(self) -> (S, D) {
        (self.sensor, self.delay)
    }
}

impl<S: TemperatureSensor, D: DelayNs> TemperatureSensor for AveragingSensor<S, D> {
    /// Mean of the successful samples
    ///
    /// Failed samples are skipped. If none succeed the last error is
    /// returned.
    fn read_celsius(&mut self) -> Result<f64, SensorError> {
        let mut sum = 0.0;
        let mut good = 0u8;
        let mut last_error = SensorError::ConversionError;

        for sample in 0..self.samples {
            if sample > 0 {
                self.delay.delay_ms(self.interval_ms);
            }
            match self.sensor.read_celsius() {
                Ok(celsius) => {
                    sum += celsius;
                    good += 1;
                }
                Err(e) => last_error = e,
            }
        }

        if good == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("No valid temperature sample: {}", last_error);
            return Err(last_error);
        }

        #[cfg(feature = "defmt")]
        if good < self.samples {
            defmt::warn!("{} of {} temperature samples failed", self.samples - good, self.samples);
        }

        Ok(sum / f64::from(good))
    }
}
