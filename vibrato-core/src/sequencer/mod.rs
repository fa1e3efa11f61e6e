//! Execution sequencer
//!
//! Walks an assembled strategy point by point and drives the outputs
//! through timed phases.

pub mod executor;
pub mod pattern;
pub mod phase;
pub mod report;

pub use executor::{ActiveProgress, ExecutionState, Sequencer, SequencerError};
pub use pattern::{adjusted_rpm_x10, pattern_for, step_interval_us, CLOCKWISE, COUNTER_CLOCKWISE};
pub use phase::{Phase, PhaseEvent};
pub use report::{
    ExecutionReport, PhaseTimestamps, PointFault, PointLog, PointStatus, RunOutcome,
};
