//! Operator panel implementations

pub mod gpio;

pub use gpio::{GpioSignalLine, SignalPanel};
