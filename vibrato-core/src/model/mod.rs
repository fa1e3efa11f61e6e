//! Physical models used by the planner

pub mod radius;

pub use radius::{radius_cm, temperature_factor, DEFAULT_K, MAX_RADIUS_CM, MIN_RADIUS_CM};
