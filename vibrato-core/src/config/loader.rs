//! Configuration loading and validation

use core::str;

use super::types::MachineConfig;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing failed
    Parse,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// A value is outside what the machine can run
    Invalid(&'static str),
}

impl MachineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: MachineConfig = toml::from_str(input).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("Failed to parse machine config");
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML read from storage
    pub fn from_toml_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let input = str::from_utf8(bytes).map_err(|_| ConfigError::InvalidUtf8)?;
        Self::from_toml(input)
    }

    /// Reject values the sequencer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stepper = &self.stepper;
        if stepper.steps_per_revolution == 0 {
            return Err(ConfigError::Invalid("steps_per_revolution must be positive"));
        }
        if stepper.min_rpm == 0 {
            return Err(ConfigError::Invalid("min_rpm must be positive"));
        }
        if stepper.min_rpm > stepper.max_rpm {
            return Err(ConfigError::Invalid("min_rpm exceeds max_rpm"));
        }
        if self.sequencer.poll_slice_ms == 0 {
            return Err(ConfigError::Invalid("poll_slice_ms must be positive"));
        }
        Ok(())
    }
}
