//! NTC 10K thermistor sensor
//!
//! Concrete-temperature probe: a 10K B3950 thermistor in a divider with a
//! 10K series resistor, read through an 8-bit converter (PCF8591 on the
//! reference panel). Temperature comes from the beta equation.

use vibrato_core::traits::{SensorError, TemperatureSensor};

const KELVIN_OFFSET: f64 = 273.15;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read the raw conversion result (0..=adc_max)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Thermistor and divider parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NtcParams {
    /// Series resistor (ohms)
    pub series_ohms: f64,
    /// Thermistor resistance at `t0_c` (ohms)
    pub r0_ohms: f64,
    /// Reference temperature for `r0_ohms` (°C)
    pub t0_c: f64,
    /// Beta coefficient (K)
    pub beta: f64,
    /// Full-scale ADC count
    pub adc_max: u16,
    /// Lowest temperature reported; colder readings are clamped
    pub min_c: f64,
    /// Highest temperature reported; hotter readings are clamped
    pub max_c: f64,
}

impl Default for NtcParams {
    fn default() -> Self {
        Self {
            series_ohms: 10_000.0,
            r0_ohms: 10_000.0,
            t0_c: 25.0,
            beta: 3950.0,
            adc_max: 255,
            min_c: -10.0,
            max_c: 50.0,
        }
    }
}

/// NTC 10K thermistor with B=3950
pub struct Ntc10kSensor<ADC> {
    adc: ADC,
    params: NtcParams,
}

impl<ADC> Ntc10kSensor<ADC> {
    /// Create a sensor with the reference divider
    pub fn new(adc: ADC) -> Self {
        Self::with_params(adc, NtcParams::default())
    }

    pub fn with_params(adc: ADC, params: NtcParams) -> Self {
        Self { adc, params }
    }

    pub fn params(&self) -> &NtcParams {
        &self.params
    }

    /// Convert an ADC reading to thermistor resistance
    ///
    /// R_ntc = R_series * adc / (adc_max - adc)
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<f64, SensorError> {
        // Divider fully at the rail: thermistor missing
        if adc_value >= self.params.adc_max {
            return Err(SensorError::OpenCircuit);
        }

        if adc_value == 0 {
            return Err(SensorError::ShortCircuit);
        }

        let adc = f64::from(adc_value);
        let full = f64::from(self.params.adc_max);
        Ok(self.params.series_ohms * adc / (full - adc))
    }

    /// Beta equation, clamped to the reporting range
    pub fn resistance_to_celsius(&self, resistance: f64) -> Result<f64, SensorError> {
        if !(resistance.is_finite() && resistance > 0.0) {
            return Err(SensorError::OutOfRange);
        }

        let p = &self.params;
        let inv_t = libm::log(resistance / p.r0_ohms) / p.beta + 1.0 / (p.t0_c + KELVIN_OFFSET);
        let celsius = 1.0 / inv_t - KELVIN_OFFSET;
        if !celsius.is_finite() {
            return Err(SensorError::OutOfRange);
        }

        Ok(celsius.clamp(p.min_c, p.max_c))
    }
}

impl<ADC: AdcReader> TemperatureSensor for Ntc10kSensor<ADC> {
    fn read_celsius(&mut self) -> Result<f64, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        let resistance = self.adc_to_resistance(adc_value)?;
        self.resistance_to_celsius(resistance)
    }
}

/// Dummy ADC for testing (returns a fixed value)
#[cfg(test)]
pub struct DummyAdc(pub u16);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        Ok(self.0)
    }
}
