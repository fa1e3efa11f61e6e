//! Temperature sensor implementations

pub mod averaging;
pub mod ntc10k;

pub use averaging::AveragingSensor;
pub use ntc10k::{AdcReader, Ntc10kSensor, NtcParams};
