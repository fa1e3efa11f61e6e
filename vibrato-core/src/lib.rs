//! Board-agnostic core logic for the Vibrato slab compactor
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Compaction radius model
//! - Point layout generation and strategy assembly
//! - Execution sequencer (per-point phase machine)
//! - Hardware abstraction traits (coil actuator, signal outputs, timing,
//!   temperature sensing, plan storage)
//! - Configuration type definitions and TOML loading
//! - Strategy and run archiving
//! - Simulated backend for dry runs

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod archive;
pub mod config;
pub mod model;
pub mod plan;
pub mod sequencer;
pub mod sim;
pub mod traits;
