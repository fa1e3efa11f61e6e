//! Effective compaction radius model
//!
//! Empirical fit relating probe power, slump, frequency, aggregate size and
//! viscosity to the radius over which one insertion compacts the mix:
//!
//! ```text
//! R = K * (P^0.7 * S^0.6 * f^0.4) / (d^0.5 * mu^0.4)
//! ```
//!
//! `K` depends on ambient temperature. The result is clamped to
//! [`MIN_RADIUS_CM`, `MAX_RADIUS_CM`].

use libm::pow;

/// Smallest radius the model reports (cm)
pub const MIN_RADIUS_CM: f64 = 20.0;

/// Largest radius the model reports (cm)
pub const MAX_RADIUS_CM: f64 = 60.0;

/// Correction constant used when no temperature is known
pub const DEFAULT_K: f64 = 2.0;

const POWER_EXP: f64 = 0.7;
const SLUMP_EXP: f64 = 0.6;
const FREQ_EXP: f64 = 0.4;
const AGGREGATE_EXP: f64 = 0.5;
const VISCOSITY_EXP: f64 = 0.4;

/// Correction constant for an ambient temperature
///
/// Cold mixes compact less per insertion, so `K` rises below 20 °C and
/// falls above 30 °C. A missing or non-finite reading selects
/// [`DEFAULT_K`].
pub fn temperature_factor(temperature_c: Option<f64>) -> f64 {
    match temperature_c {
        Some(t) if t.is_nan() => DEFAULT_K,
        Some(t) if t < 10.0 => 2.4,
        Some(t) if t <= 20.0 => 2.2,
        Some(t) if t <= 30.0 => 2.0,
        Some(_) => 1.8,
        None => DEFAULT_K,
    }
}

/// Effective compaction radius in centimeters
///
/// Callers pass validated inputs (see `PhysicalInputs`); the clamp keeps the
/// result inside the model's range for any finite positive input.
pub fn radius_cm(
    freq_hz: f64,
    power_kw: f64,
    slump_mm: f64,
    aggregate_size_mm: f64,
    viscosity_pas: f64,
    temperature_c: Option<f64>,
) -> f64 {
    let k = temperature_factor(temperature_c);

    let numerator = pow(power_kw, POWER_EXP) * pow(slump_mm, SLUMP_EXP) * pow(freq_hz, FREQ_EXP);
    let denominator = pow(aggregate_size_mm, AGGREGATE_EXP) * pow(viscosity_pas, VISCOSITY_EXP);

    let radius = k * numerator / denominator;
    if radius.is_nan() {
        return MIN_RADIUS_CM;
    }
    radius.clamp(MIN_RADIUS_CM, MAX_RADIUS_CM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_brackets() {
        assert_eq!(temperature_factor(None), 2.0);
        assert_eq!(temperature_factor(Some(-5.0)), 2.4);
        assert_eq!(temperature_factor(Some(9.99)), 2.4);
        assert_eq!(temperature_factor(Some(10.0)), 2.2);
        assert_eq!(temperature_factor(Some(20.0)), 2.2);
        assert_eq!(temperature_factor(Some(20.5)), 2.0);
        assert_eq!(temperature_factor(Some(30.0)), 2.0);
        assert_eq!(temperature_factor(Some(30.1)), 1.8);
        assert_eq!(temperature_factor(Some(f64::NAN)), 2.0);
    }

    #[test]
    fn test_reference_mix() {
        // 2 kW probe, 180 mm slump, 20 mm aggregate, 60 Pa·s, 25 °C
        let r = radius_cm(180.0, 2.0, 180.0, 20.0, 60.0, Some(25.0));
        assert!((r - 25.4).abs() < 0.5, "radius {}", r);
    }

    #[test]
    fn test_clamped_low() {
        let r = radius_cm(120.0, 1.0, 50.0, 40.0, 100.0, Some(35.0));
        assert_eq!(r, MIN_RADIUS_CM);
    }

    #[test]
    fn test_clamped_high() {
        let r = radius_cm(220.0, 3.0, 180.0, 5.0, 10.0, Some(0.0));
        assert_eq!(r, MAX_RADIUS_CM);
    }

    #[test]
    fn test_monotonic_in_frequency() {
        let low = radius_cm(150.0, 2.0, 150.0, 10.0, 40.0, None);
        let high = radius_cm(200.0, 2.0, 150.0, 10.0, 40.0, None);
        assert!(high >= low);
    }
}
