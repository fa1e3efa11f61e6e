//! Environment sensor traits

/// Errors that can occur with sensor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Trait for temperature sensors
///
/// Takes `&mut self` because ADC reads typically require mutable access.
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    fn read_celsius(&mut self) -> Result<f64, SensorError>;
}
