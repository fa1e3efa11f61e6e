//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in vibrato-core:
//!
//! - Probe drive (ULN2003 unipolar stepper)
//! - Operator panel (GPIO lamps and buzzer)
//! - Temperature sensors (NTC 10K thermistor, sample averaging)
//! - Plan storage (in-memory map)

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod sensor;
pub mod signal;
pub mod stepper;
pub mod storage;
