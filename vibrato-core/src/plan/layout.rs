//! Treatment point layout
//!
//! Tiles the slab with a rectangular grid whose pitch follows the base
//! compaction radius, then perturbs each point's frequency and time by its
//! position. Generation is deterministic: identical inputs give identical
//! points.

use alloc::vec::Vec;

use libm::{cos, floor, round, sin, sqrt, trunc};
use serde::{Deserialize, Serialize};

use super::inputs::{PhysicalInputs, SlabGeometry};
use crate::model::{MAX_RADIUS_CM, MIN_RADIUS_CM};

/// Lowest frequency a point may be driven at (Hz)
pub const MIN_FREQ_HZ: u16 = 120;
/// Highest frequency a point may be driven at (Hz)
pub const MAX_FREQ_HZ: u16 = 220;
/// Longest dwell at a single point (s)
pub const MAX_TIME_S: u16 = 20;

/// Frequency boost for boundary points (Hz)
pub const EDGE_FREQ_BOOST: i32 = 20;
/// Frequency cut near the slab center (Hz)
pub const CENTER_FREQ_CUT: i32 = 15;
/// Extra dwell for boundary points (s)
pub const EDGE_TIME_BOOST: u16 = 2;
/// Normalized distance below which a point counts as central
pub const CENTER_ZONE: f64 = 0.2;
/// Clearance kept between probe tip and the slab's far face (cm)
pub const DEPTH_MARGIN_CM: f64 = 5.0;
/// Grid pitch as a multiple of the compaction radius
pub const SPACING_FACTOR: f64 = 1.8;

/// One planned insertion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    /// 1-based, row-major; also execution order
    pub id: u32,
    /// Meters from the slab's origin corner, rounded to 0.01
    pub x: f64,
    pub y: f64,
    pub freq_hz: u16,
    pub time_s: u16,
    pub depth_cm: f64,
    pub radius_cm: f64,
}

/// Grid dimensions derived from slab size and radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
    pub spacing_m: f64,
}

impl GridShape {
    /// Grid for a slab at a given base radius
    ///
    /// Always at least 2 x 2, even when the slab is smaller than one pitch.
    pub fn for_slab(geometry: &SlabGeometry, base_radius_cm: f64) -> Self {
        let radius = if base_radius_cm.is_nan() {
            MIN_RADIUS_CM
        } else {
            base_radius_cm.clamp(MIN_RADIUS_CM, MAX_RADIUS_CM)
        };
        let spacing_m = radius * SPACING_FACTOR / 100.0;

        // Float-to-int casts saturate; NaN and negatives land on 0
        let rows = (floor(geometry.length_m / spacing_m) as usize).max(2);
        let cols = (floor(geometry.width_m / spacing_m) as usize).max(2);

        Self {
            rows,
            cols,
            spacing_m,
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if cell `(row, col)` lies on the grid boundary
    pub fn is_edge(&self, row: usize, col: usize) -> bool {
        row == 0 || row == self.rows - 1 || col == 0 || col == self.cols - 1
    }
}

/// Position class of a grid cell, first match wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Zone {
    /// Outer row or column
    Edge,
    /// Within [`CENTER_ZONE`] of the slab midpoint
    Center,
    /// Everything else
    Interior,
}

/// Distance to the slab midpoint, normalized per axis by slab size
pub fn center_distance(geometry: &SlabGeometry, x: f64, y: f64) -> f64 {
    let dx = (x - geometry.width_m / 2.0) / geometry.width_m;
    let dy = (y - geometry.length_m / 2.0) / geometry.length_m;
    sqrt(dx * dx + dy * dy)
}

/// Frequency adjustment (Hz) for a cell in `zone`
///
/// Interior cells follow two spatial waves plus a radial term to model
/// uneven compaction demand.
pub fn frequency_adjustment(zone: Zone, x: f64, y: f64, distance: f64) -> i32 {
    match zone {
        Zone::Edge => EDGE_FREQ_BOOST,
        Zone::Center => -CENTER_FREQ_CUT,
        Zone::Interior => {
            let wave = trunc(sin(x * 5.0) * 10.0 + cos(y * 3.0) * 10.0) as i32;
            wave + floor(distance * 30.0) as i32
        }
    }
}

fn round_cm(value: f64) -> f64 {
    round(value * 100.0) / 100.0
}

/// Generate the ordered treatment points for a slab
pub fn generate_points(
    geometry: &SlabGeometry,
    base_freq_hz: u16,
    base_time_s: u16,
    base_depth_cm: f64,
    base_radius_cm: f64,
    inputs: &PhysicalInputs,
) -> Vec<Point> {
    let grid = GridShape::for_slab(geometry, base_radius_cm);
    let depth_cm = (geometry.thickness_cm - DEPTH_MARGIN_CM)
        .min(base_depth_cm)
        .max(0.0);

    let mut points = Vec::with_capacity(grid.len());

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let x = col as f64 * grid.spacing_m;
            let y = row as f64 * grid.spacing_m;
            let distance = center_distance(geometry, x, y);

            let zone = if grid.is_edge(row, col) {
                Zone::Edge
            } else if distance < CENTER_ZONE {
                Zone::Center
            } else {
                Zone::Interior
            };

            let adjustment = frequency_adjustment(zone, x, y, distance);
            let freq_hz = (i32::from(base_freq_hz) + adjustment)
                .clamp(i32::from(MIN_FREQ_HZ), i32::from(MAX_FREQ_HZ)) as u16;

            let time_boost = if zone == Zone::Edge { EDGE_TIME_BOOST } else { 0 };
            let time_s = base_time_s.saturating_add(time_boost).min(MAX_TIME_S);

            points.push(Point {
                id: points.len() as u32 + 1,
                x: round_cm(x),
                y: round_cm(y),
                freq_hz,
                time_s,
                depth_cm,
                radius_cm: inputs.radius_at(f64::from(freq_hz)),
            });
        }
    }

    points
}
