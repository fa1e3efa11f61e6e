//! Strategy assembly
//!
//! Derives the base vibration parameters from material and site readings,
//! lays out the points and packages everything into one [`Strategy`]
//! document. Assembly never fails: inputs are sanitized first.

use alloc::vec::Vec;

use libm::fma;
use serde::{Deserialize, Serialize};

use super::inputs::{
    AggregateType, Corrections, EnvironmentInfo, MaterialInfo, PhysicalInputs, SlabGeometry,
};
use super::layout::{generate_points, GridShape, Point, MAX_FREQ_HZ, MAX_TIME_S, MIN_FREQ_HZ};

/// Starting frequency before adjustments (Hz)
pub const BASE_FREQ_HZ: i32 = 180;
/// Starting dwell before adjustments (s)
pub const BASE_TIME_S: i32 = 10;
/// Starting insertion depth before adjustments (cm)
pub const BASE_DEPTH_CM: i32 = 40;

const MIN_BASE_TIME_S: i32 = 6;
const MIN_BASE_DEPTH_CM: i32 = 20;
const MAX_BASE_DEPTH_CM: i32 = 60;

/// Material block of the plan document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaterialSummary {
    pub aggregate_type: AggregateType,
    pub water_cement_ratio: f64,
    pub aggregate_size_mm: f64,
    pub viscosity_pas: f64,
}

/// Base parameters every point is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VibrationParams {
    pub power_kw: f64,
    pub base_freq_hz: u16,
    pub base_time_s: u16,
    pub base_depth_cm: f64,
    pub base_radius_cm: f64,
}

/// Complete compaction plan
///
/// Built once by [`assemble`], archived, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub board_info: SlabGeometry,
    pub material_info: MaterialSummary,
    pub environment_info: EnvironmentInfo,
    pub vibration_params: VibrationParams,
    /// Execution order
    pub points: Vec<Point>,
    pub total_points: usize,
    pub estimated_time_min: f64,
}

/// Diagnostic overview of a plan
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanSummary {
    pub rows: usize,
    pub cols: usize,
    pub spacing_m: f64,
    pub total_points: usize,
    pub min_freq_hz: u16,
    pub max_freq_hz: u16,
    pub estimated_time_min: f64,
}

/// Base frequency from aggregate shape, slump and reinforcement
pub fn base_frequency(material: &MaterialInfo, environment: &EnvironmentInfo) -> u16 {
    let mut freq = BASE_FREQ_HZ;
    if material.aggregate_type == AggregateType::Round {
        freq -= 10;
    }
    if environment.slump < 160.0 {
        freq += 10;
    }
    if environment.slump > 200.0 {
        freq -= 10;
    }
    if environment.rebar_density > 0.4 {
        freq += 5;
    }
    freq.clamp(i32::from(MIN_FREQ_HZ), i32::from(MAX_FREQ_HZ)) as u16
}

/// Base dwell from slump and water-cement ratio
pub fn base_time(material: &MaterialInfo, environment: &EnvironmentInfo) -> u16 {
    let mut time = BASE_TIME_S;
    if environment.slump < 160.0 {
        time += 4;
    }
    if environment.slump > 200.0 {
        time -= 2;
    }
    if material.water_cement_ratio < 0.42 {
        time += 2;
    }
    time.clamp(MIN_BASE_TIME_S, i32::from(MAX_TIME_S)) as u16
}

/// Base insertion depth from humidity
pub fn base_depth(environment: &EnvironmentInfo) -> f64 {
    let mut depth = BASE_DEPTH_CM;
    if environment.humidity < 55.0 {
        depth += 5;
    }
    if environment.humidity > 70.0 {
        depth -= 3;
    }
    f64::from(depth.clamp(MIN_BASE_DEPTH_CM, MAX_BASE_DEPTH_CM))
}

/// Total dwell in minutes, rounded to one decimal
///
/// Rounds the binary value of `total / 60` to the nearest tenth, ties to
/// even. Halfway totals (`total % 6 == 3`) go up or down depending on
/// which side of the tie the division result landed: 15 s reports 0.2 min
/// and 3 s reports 0.1 min.
pub fn estimated_minutes(points: &[Point]) -> f64 {
    let total_s: u64 = points.iter().map(|p| u64::from(p.time_s)).sum();
    let tenths = total_s / 6;

    let rounded = if total_s % 6 != 3 {
        (total_s + 3) / 6
    } else {
        // Exact residual of the division: sign says which side of the tie
        let minutes = total_s as f64 / 60.0;
        let residual = fma(minutes, 60.0, -(total_s as f64));
        if residual > 0.0 || (residual == 0.0 && tenths % 2 == 1) {
            tenths + 1
        } else {
            tenths
        }
    };
    rounded as f64 / 10.0
}

/// Assemble a strategy, discarding the correction log
pub fn assemble(
    material: &MaterialInfo,
    environment: &EnvironmentInfo,
    geometry: &SlabGeometry,
    inputs: &PhysicalInputs,
) -> Strategy {
    let mut corrections = Corrections::new();
    assemble_with_corrections(material, environment, geometry, inputs, &mut corrections)
}

/// Assemble a strategy, recording every clamped input
pub fn assemble_with_corrections(
    material: &MaterialInfo,
    environment: &EnvironmentInfo,
    geometry: &SlabGeometry,
    inputs: &PhysicalInputs,
    corrections: &mut Corrections,
) -> Strategy {
    let material = material.sanitize(corrections);
    let environment = environment.sanitize(corrections);
    let geometry = geometry.sanitize(corrections);
    let inputs = inputs.sanitize(corrections);

    let base_freq_hz = base_frequency(&material, &environment);
    let base_time_s = base_time(&material, &environment);
    let base_depth_cm = base_depth(&environment);
    let base_radius_cm = inputs.radius_at(f64::from(base_freq_hz));

    let points = generate_points(
        &geometry,
        base_freq_hz,
        base_time_s,
        base_depth_cm,
        base_radius_cm,
        &inputs,
    );

    let strategy = Strategy {
        board_info: geometry,
        material_info: MaterialSummary {
            aggregate_type: material.aggregate_type,
            water_cement_ratio: material.water_cement_ratio,
            aggregate_size_mm: inputs.aggregate_size_mm,
            viscosity_pas: inputs.viscosity_pas,
        },
        environment_info: environment,
        vibration_params: VibrationParams {
            power_kw: inputs.power_kw,
            base_freq_hz,
            base_time_s,
            base_depth_cm,
            base_radius_cm,
        },
        total_points: points.len(),
        estimated_time_min: estimated_minutes(&points),
        points,
    };

    #[cfg(feature = "defmt")]
    {
        let summary = strategy.summary();
        defmt::info!(
            "Plan: {} points ({} x {}), base {} Hz / {} s / {} cm, radius {} cm, ~{} min",
            summary.total_points,
            summary.cols,
            summary.rows,
            base_freq_hz,
            base_time_s,
            base_depth_cm,
            base_radius_cm,
            summary.estimated_time_min
        );
    }

    strategy
}

impl Strategy {
    pub fn grid(&self) -> GridShape {
        GridShape::for_slab(&self.board_info, self.vibration_params.base_radius_cm)
    }

    pub fn summary(&self) -> PlanSummary {
        let grid = self.grid();
        let min_freq_hz = self.points.iter().map(|p| p.freq_hz).min().unwrap_or(0);
        let max_freq_hz = self.points.iter().map(|p| p.freq_hz).max().unwrap_or(0);

        PlanSummary {
            rows: grid.rows,
            cols: grid.cols,
            spacing_m: grid.spacing_m,
            total_points: self.total_points,
            min_freq_hz,
            max_freq_hz,
            estimated_time_min: self.estimated_time_min,
        }
    }

    /// Check the document invariants
    ///
    /// Useful after loading a plan from storage.
    pub fn is_consistent(&self) -> bool {
        let thickness = self.board_info.thickness_cm;
        self.total_points == self.points.len()
            && self.points.iter().enumerate().all(|(index, p)| {
                p.id as usize == index + 1
                    && p.depth_cm < thickness
                    && (MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&p.freq_hz)
                    && p.time_s <= MAX_TIME_S
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::inputs::InputField;

    fn reference_inputs() -> (MaterialInfo, EnvironmentInfo, SlabGeometry, PhysicalInputs) {
        let material = MaterialInfo::from_ticket(AggregateType::Crushed, 0.45, "5-20");
        let environment = EnvironmentInfo::default();
        let geometry = SlabGeometry::default();
        let mut corrections = Corrections::new();
        let inputs = PhysicalInputs::from_readings(&material, &environment, 2.0, &mut corrections);
        (material, environment, geometry, inputs)
    }

    #[test]
    fn test_base_frequency_rules() {
        let mut material = MaterialInfo::default();
        let mut env = EnvironmentInfo::default();
        assert_eq!(base_frequency(&material, &env), 180);

        material.aggregate_type = AggregateType::Round;
        env.slump = 150.0;
        env.rebar_density = 0.5;
        assert_eq!(base_frequency(&material, &env), 185);

        env.slump = 210.0;
        assert_eq!(base_frequency(&material, &env), 165);
    }

    #[test]
    fn test_base_time_rules() {
        let mut material = MaterialInfo::default();
        let mut env = EnvironmentInfo::default();
        assert_eq!(base_time(&material, &env), 10);

        env.slump = 120.0;
        material.water_cement_ratio = 0.4;
        assert_eq!(base_time(&material, &env), 16);

        env.slump = 250.0;
        assert_eq!(base_time(&material, &env), 10);
    }

    #[test]
    fn test_base_depth_rules() {
        let mut env = EnvironmentInfo::default();
        assert_eq!(base_depth(&env), 40.0);
        env.humidity = 50.0;
        assert_eq!(base_depth(&env), 45.0);
        env.humidity = 80.0;
        assert_eq!(base_depth(&env), 37.0);
    }

    #[test]
    fn test_reference_strategy() {
        let (material, environment, geometry, inputs) = reference_inputs();
        let strategy = assemble(&material, &environment, &geometry, &inputs);

        assert_eq!(strategy.vibration_params.base_freq_hz, 180);
        assert_eq!(strategy.vibration_params.base_time_s, 10);
        assert_eq!(strategy.vibration_params.base_depth_cm, 40.0);
        assert!((strategy.vibration_params.base_radius_cm - 25.4).abs() < 0.5);
        assert_eq!(strategy.material_info.viscosity_pas, 60.0);

        assert_eq!(strategy.total_points, 48);
        assert!(strategy.is_consistent());
        assert!(strategy.points.iter().all(|p| p.depth_cm <= 25.0));
        assert_eq!(strategy.estimated_time_min, estimated_minutes(&strategy.points));

        let summary = strategy.summary();
        assert_eq!((summary.rows, summary.cols), (8, 6));
        assert!(summary.max_freq_hz >= 200);
        assert!(summary.min_freq_hz >= MIN_FREQ_HZ);
    }

    #[test]
    fn test_estimated_minutes_rounding() {
        let point = |time_s| Point {
            id: 1,
            x: 0.0,
            y: 0.0,
            freq_hz: 180,
            time_s,
            depth_cm: 25.0,
            radius_cm: 25.0,
        };
        // 12 + 12 + 10 = 34 s = 0.5666 min
        let points = [point(12), point(12), point(10)];
        assert_eq!(estimated_minutes(&points), 0.6);
        assert_eq!(estimated_minutes(&[]), 0.0);
    }

    #[test]
    fn test_estimated_minutes_halfway_totals() {
        let point = |time_s| Point {
            id: 1,
            x: 0.0,
            y: 0.0,
            freq_hz: 180,
            time_s,
            depth_cm: 25.0,
            radius_cm: 25.0,
        };
        // 0.25 is exact: ties to even
        assert_eq!(estimated_minutes(&[point(7), point(8)]), 0.2);
        assert_eq!(estimated_minutes(&[point(20), point(20), point(5)]), 0.8);
        // 0.05, 0.15 and 0.35 fall just above or below the tie
        assert_eq!(estimated_minutes(&[point(3)]), 0.1);
        assert_eq!(estimated_minutes(&[point(9)]), 0.1);
        assert_eq!(estimated_minutes(&[point(10), point(11)]), 0.3);
        // Not a tie
        assert_eq!(estimated_minutes(&[point(16)]), 0.3);
    }

    #[test]
    fn test_lenient_inputs() {
        let material = MaterialInfo {
            aggregate_type: AggregateType::Crushed,
            water_cement_ratio: f64::NAN,
            aggregate_size_mm: 90.0,
        };
        let environment = EnvironmentInfo {
            humidity: -20.0,
            ..EnvironmentInfo::default()
        };
        let geometry = SlabGeometry::new(-1.0, 2.0, 0.0);
        let inputs = PhysicalInputs {
            power_kw: 7.0,
            slump_mm: 180.0,
            aggregate_size_mm: 90.0,
            viscosity_pas: 60.0,
            temperature_c: None,
        };

        let mut corrections = Corrections::new();
        let strategy =
            assemble_with_corrections(&material, &environment, &geometry, &inputs, &mut corrections);

        assert!(strategy.is_consistent());
        assert!(strategy.total_points >= 4);
        assert_eq!(strategy.vibration_params.power_kw, 3.0);
        assert_eq!(strategy.material_info.water_cement_ratio, 0.5);
        assert_eq!(corrections.for_field(InputField::AggregateSize).count(), 2);
        assert_eq!(corrections.for_field(InputField::Width).count(), 1);
        assert_eq!(corrections.for_field(InputField::Thickness).count(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let (material, environment, geometry, inputs) = reference_inputs();
        let strategy = assemble(&material, &environment, &geometry, &inputs);
        let json = serde_json::to_string(&strategy).unwrap();

        for key in [
            "\"board_info\"",
            "\"material_info\"",
            "\"environment_info\"",
            "\"vibration_params\"",
            "\"points\"",
            "\"total_points\"",
            "\"estimated_time_min\"",
            "\"base_radius_cm\"",
            "\"rebar_density\"",
        ] {
            assert!(json.contains(key), "missing {}", key);
        }
    }
}
