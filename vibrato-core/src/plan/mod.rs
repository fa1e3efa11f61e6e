//! Strategy planning
//!
//! Turns material and site readings into an ordered list of treatment
//! points:
//!
//! - `inputs`: input records and the clamp-and-record sanitation policy
//! - `layout`: grid tiling and per-point adjustments
//! - `strategy`: base parameter derivation and plan assembly

pub mod inputs;
pub mod layout;
pub mod strategy;

pub use inputs::{
    parse_grading_max, AggregateType, Corrections, EnvironmentInfo, InputCorrection, InputField,
    MaterialInfo, PhysicalInputs, SlabGeometry,
};
pub use layout::{generate_points, GridShape, Point, Zone, MAX_FREQ_HZ, MAX_TIME_S, MIN_FREQ_HZ};
pub use strategy::{
    assemble, assemble_with_corrections, base_depth, base_frequency, base_time, estimated_minutes,
    MaterialSummary, PlanSummary, Strategy, VibrationParams,
};
