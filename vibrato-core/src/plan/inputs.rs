//! Planner input records
//!
//! Material and environment records arrive from external collaborators
//! (ticket OCR, sensors, operator entry). The planner never rejects them:
//! out-of-domain values are clamped and every change is recorded as an
//! [`InputCorrection`].

use serde::{Deserialize, Serialize};

use crate::model::radius_cm;
use crate::traits::SensorError;

/// Coarse aggregate shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum AggregateType {
    /// Crushed stone
    #[default]
    Crushed,
    /// Rounded river gravel (pebbles)
    Round,
}

impl AggregateType {
    /// Parse a label from a delivery ticket
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "crushed" | "crushed_stone" => Some(AggregateType::Crushed),
            "round" | "pebble" | "gravel" => Some(AggregateType::Round),
            _ => None,
        }
    }
}

/// Which input a correction applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Temperature,
    Humidity,
    Slump,
    RebarDensity,
    WaterCementRatio,
    AggregateSize,
    Viscosity,
    Power,
    Width,
    Length,
    Thickness,
}

/// A value replaced during input sanitation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputCorrection {
    pub field: InputField,
    pub original: f64,
    pub corrected: f64,
}

/// Maximum corrections kept per planning run
pub const MAX_CORRECTIONS: usize = 16;

/// Corrections collected while sanitizing one set of inputs
#[derive(Debug, Clone, Default)]
pub struct Corrections {
    entries: heapless::Vec<InputCorrection, MAX_CORRECTIONS>,
    overflowed: bool,
}

impl Corrections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `value` into `[min, max]`, substituting `default` when it is
    /// not finite
    pub fn clamp(&mut self, field: InputField, value: f64, min: f64, max: f64, default: f64) -> f64 {
        let corrected = if value.is_finite() {
            value.clamp(min, max)
        } else {
            default
        };

        if corrected != value {
            self.record(InputCorrection {
                field,
                original: value,
                corrected,
            });
        }
        corrected
    }

    fn record(&mut self, correction: InputCorrection) {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "Input {} out of domain: {} -> {}",
            correction.field,
            correction.original,
            correction.corrected
        );

        if self.entries.push(correction).is_err() {
            self.overflowed = true;
        }
    }

    /// Recorded corrections, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &InputCorrection> {
        self.entries.iter()
    }

    /// Corrections applied to `field`
    pub fn for_field(&self, field: InputField) -> impl Iterator<Item = &InputCorrection> {
        self.entries.iter().filter(move |c| c.field == field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if more corrections happened than could be stored
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

/// Mix description from the delivery ticket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaterialInfo {
    pub aggregate_type: AggregateType,
    pub water_cement_ratio: f64,
    pub aggregate_size_mm: f64,
}

/// Water-cement ratio assumed when the ticket gives none
pub const DEFAULT_WATER_CEMENT_RATIO: f64 = 0.5;

/// Maximum aggregate size assumed when the grading is unknown (mm)
pub const DEFAULT_AGGREGATE_SIZE_MM: f64 = 20.0;

/// Extract the maximum size from a coarse aggregate grading such as `"5-25"`
pub fn parse_grading_max(grading: &str) -> Option<f64> {
    let (_, upper) = grading.split_once('-')?;
    let upper = upper.trim().trim_end_matches("mm").trim();
    let value: f64 = upper.parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            aggregate_type: AggregateType::Crushed,
            water_cement_ratio: DEFAULT_WATER_CEMENT_RATIO,
            aggregate_size_mm: DEFAULT_AGGREGATE_SIZE_MM,
        }
    }
}

impl MaterialInfo {
    /// Build from a ticket, taking the aggregate size from its grading string
    pub fn from_ticket(aggregate_type: AggregateType, water_cement_ratio: f64, grading: &str) -> Self {
        Self {
            aggregate_type,
            water_cement_ratio,
            aggregate_size_mm: parse_grading_max(grading).unwrap_or(DEFAULT_AGGREGATE_SIZE_MM),
        }
    }

    /// Viscosity estimate (Pa·s) from the water-cement ratio
    pub fn estimated_viscosity(&self) -> f64 {
        let wc = self.water_cement_ratio;
        if wc < 0.4 {
            80.0
        } else if wc < 0.5 {
            60.0
        } else if wc < 0.6 {
            40.0
        } else {
            30.0
        }
    }

    pub fn sanitize(self, corrections: &mut Corrections) -> Self {
        Self {
            aggregate_type: self.aggregate_type,
            water_cement_ratio: corrections.clamp(
                InputField::WaterCementRatio,
                self.water_cement_ratio,
                0.25,
                0.8,
                DEFAULT_WATER_CEMENT_RATIO,
            ),
            aggregate_size_mm: corrections.clamp(
                InputField::AggregateSize,
                self.aggregate_size_mm,
                5.0,
                40.0,
                DEFAULT_AGGREGATE_SIZE_MM,
            ),
        }
    }
}

/// Site readings at pour time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvironmentInfo {
    /// Ambient temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Measured slump (mm)
    pub slump: f64,
    /// Reinforcement density (0 = none, 1 = congested)
    pub rebar_density: f64,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 60.0,
            slump: 180.0,
            rebar_density: 0.3,
        }
    }
}

impl EnvironmentInfo {
    /// Take the ambient temperature from a probe reading
    ///
    /// A failed read falls back to the default temperature.
    pub fn with_sensed_temperature(self, reading: Result<f64, SensorError>) -> Self {
        let temperature = match reading {
            Ok(celsius) => celsius,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Temperature probe failed ({}), using default", _e);
                Self::default().temperature
            }
        };
        Self { temperature, ..self }
    }

    /// Replace missing readings with defaults and clamp the rest
    pub fn sanitize(self, corrections: &mut Corrections) -> Self {
        let defaults = Self::default();
        Self {
            temperature: corrections.clamp(
                InputField::Temperature,
                self.temperature,
                -40.0,
                80.0,
                defaults.temperature,
            ),
            humidity: corrections.clamp(InputField::Humidity, self.humidity, 0.0, 100.0, defaults.humidity),
            slump: corrections.clamp(InputField::Slump, self.slump, 0.0, 300.0, defaults.slump),
            rebar_density: corrections.clamp(
                InputField::RebarDensity,
                self.rebar_density,
                0.0,
                1.0,
                defaults.rebar_density,
            ),
        }
    }
}

/// Slab dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlabGeometry {
    pub width_m: f64,
    pub length_m: f64,
    pub thickness_cm: f64,
}

impl Default for SlabGeometry {
    fn default() -> Self {
        Self {
            width_m: 3.0,
            length_m: 4.0,
            thickness_cm: 30.0,
        }
    }
}

impl SlabGeometry {
    pub fn new(width_m: f64, length_m: f64, thickness_cm: f64) -> Self {
        Self {
            width_m,
            length_m,
            thickness_cm,
        }
    }

    /// Force every dimension positive and finite
    pub fn sanitize(self, corrections: &mut Corrections) -> Self {
        let defaults = Self::default();
        Self {
            width_m: corrections.clamp(InputField::Width, self.width_m, 0.1, 100.0, defaults.width_m),
            length_m: corrections.clamp(InputField::Length, self.length_m, 0.1, 100.0, defaults.length_m),
            thickness_cm: corrections.clamp(
                InputField::Thickness,
                self.thickness_cm,
                1.0,
                200.0,
                defaults.thickness_cm,
            ),
        }
    }
}

/// Probe power assumed when none is configured (kW)
pub const DEFAULT_POWER_KW: f64 = 2.0;

/// Inputs of the radius model, validated once per planning run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalInputs {
    /// Probe power, 1.0..=3.0 kW
    pub power_kw: f64,
    /// Slump, 50..=180 mm
    pub slump_mm: f64,
    /// Maximum aggregate size, 5..=40 mm
    pub aggregate_size_mm: f64,
    /// Mix viscosity, 10..=100 Pa·s
    pub viscosity_pas: f64,
    /// Only selects the temperature correction constant
    pub temperature_c: Option<f64>,
}

impl PhysicalInputs {
    /// Derive model inputs from site readings
    ///
    /// Slump and temperature come from the environment, viscosity is
    /// estimated from the water-cement ratio.
    pub fn from_readings(
        material: &MaterialInfo,
        environment: &EnvironmentInfo,
        power_kw: f64,
        corrections: &mut Corrections,
    ) -> Self {
        Self {
            power_kw,
            slump_mm: environment.slump,
            aggregate_size_mm: material.aggregate_size_mm,
            viscosity_pas: material.estimated_viscosity(),
            temperature_c: Some(environment.temperature),
        }
        .sanitize(corrections)
    }

    pub fn sanitize(self, corrections: &mut Corrections) -> Self {
        Self {
            power_kw: corrections.clamp(InputField::Power, self.power_kw, 1.0, 3.0, DEFAULT_POWER_KW),
            slump_mm: corrections.clamp(InputField::Slump, self.slump_mm, 50.0, 180.0, 180.0),
            aggregate_size_mm: corrections.clamp(
                InputField::AggregateSize,
                self.aggregate_size_mm,
                5.0,
                40.0,
                DEFAULT_AGGREGATE_SIZE_MM,
            ),
            viscosity_pas: corrections.clamp(InputField::Viscosity, self.viscosity_pas, 10.0, 100.0, 50.0),
            temperature_c: self.temperature_c.filter(|t| t.is_finite()),
        }
    }

    /// Compaction radius (cm) at a given frequency
    pub fn radius_at(&self, freq_hz: f64) -> f64 {
        radius_cm(
            freq_hz,
            self.power_kw,
            self.slump_mm,
            self.aggregate_size_mm,
            self.viscosity_pas,
            self.temperature_c,
        )
    }
}
