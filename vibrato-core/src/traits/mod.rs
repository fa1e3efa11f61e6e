//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod actuator;
pub mod sensor;
pub mod signal;
pub mod storage;
pub mod timing;

pub use actuator::{ActuatorError, CoilActuator, Direction, StepPattern};
pub use sensor::{SensorError, TemperatureSensor};
pub use signal::{Indicator, Polarity, SignalOutputs};
pub use storage::{PlanKey, PlanStore, RecordKind, StoreError};
pub use timing::{CancelSignal, Clock, NeverCancel, StopFlag};
