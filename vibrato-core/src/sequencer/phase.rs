//! Per-point phase machine
//!
//! Output behavior is a function of the current phase. The executor raises
//! events; this module only decides where they lead.

use serde::{Deserialize, Serialize};

/// Sequencer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not started
    #[default]
    Idle,
    /// Probe travelling to the point; all outputs off
    Approach,
    /// In position; ready lamp on
    Ready,
    /// Vibrating; active lamp and alarm on, coils stepping
    Active,
    /// Probe withdrawing; all outputs off
    Settle,
    /// Every capped point visited
    Done,
    /// Stopped by request or setup failure
    Aborted,
}

/// Events raised by the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// Run started with at least one point
    Start,
    /// Travel dwell elapsed
    Arrived,
    /// Ready dwell elapsed
    Readied,
    /// Point's vibration time elapsed
    Vibrated,
    /// Actuator failed during the point
    Fault,
    /// Settle dwell elapsed and another point remains
    Settled,
    /// No more points (or none to begin with)
    Finish,
    /// Stop requested
    Cancel,
}

impl Phase {
    /// Check if coils may be energized in this phase
    pub fn actuator_allowed(&self) -> bool {
        matches!(self, Phase::Active)
    }

    /// Check if any indicator or the alarm may be lit in this phase
    pub fn outputs_allowed(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Active)
    }

    /// Check if the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Idle, Start) => Approach,
            (Idle, Finish) => Done,

            (Approach, Arrived) => Ready,
            (Ready, Readied) => Active,
            (Active, Vibrated) => Settle,

            // A failed point still withdraws before the next one
            (Approach | Ready | Active, Fault) => Settle,

            (Settle, Settled) => Approach,
            (Settle, Finish) => Done,

            (Idle | Approach | Ready | Active | Settle, Cancel) => Aborted,

            _ => self,
        }
    }
}
