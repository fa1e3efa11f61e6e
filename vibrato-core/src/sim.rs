//! Simulated backend
//!
//! Virtual-time implementations of the hardware traits. Delays advance a
//! shared clock instead of blocking, so a full run finishes instantly and
//! always produces the same report. Used for dry runs on the host and by
//! the tests.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::config::MachineConfig;
use crate::plan::Strategy;
use crate::sequencer::{ExecutionReport, Sequencer, SequencerError};
use crate::traits::{
    ActuatorError, CancelSignal, Clock, CoilActuator, Indicator, NeverCancel, SignalOutputs,
    StepPattern,
};

/// Shared virtual clock (nanosecond resolution)
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ns: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get().saturating_add(ns));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms.saturating_mul(1_000_000));
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> u64 {
        self.now_ns.get() / 1000
    }
}

/// Delay that advances a [`SimClock`]
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: SimClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_ns(u64::from(us) * 1000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ms(u64::from(ms));
    }
}

/// Recording probe drive with fault injection
#[derive(Debug, Default)]
pub struct SimActuator {
    initialized: bool,
    coils: StepPattern,
    patterns: Vec<StepPattern>,
    step_calls: u32,
    shutdowns: u32,
    fail_init: bool,
    fail_step_at: Option<u32>,
}

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail
    pub fn fail_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make the `call`-th `step` (0-based, counted over the whole run) fail
    pub fn fail_step_at(mut self, call: u32) -> Self {
        self.fail_step_at = Some(call);
        self
    }

    /// Patterns applied successfully, in order
    pub fn patterns(&self) -> &[StepPattern] {
        &self.patterns
    }

    pub fn step_calls(&self) -> u32 {
        self.step_calls
    }

    pub fn shutdowns(&self) -> u32 {
        self.shutdowns
    }
}

impl CoilActuator for SimActuator {
    fn init(&mut self) -> Result<(), ActuatorError> {
        if self.fail_init {
            return Err(ActuatorError::Pin);
        }
        self.initialized = true;
        self.coils = StepPattern::OFF;
        Ok(())
    }

    fn step(&mut self, pattern: StepPattern) -> Result<(), ActuatorError> {
        if !self.initialized {
            return Err(ActuatorError::NotInitialized);
        }
        let call = self.step_calls;
        self.step_calls += 1;
        if self.fail_step_at == Some(call) {
            return Err(ActuatorError::Pin);
        }
        self.coils = pattern;
        self.patterns.push(pattern);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.coils = StepPattern::OFF;
        self.shutdowns += 1;
    }

    fn is_energized(&self) -> bool {
        self.coils.is_energized()
    }
}

/// Panel line, for the change log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLine {
    Indicator(Indicator),
    Alarm,
}

/// Recorded change of a panel line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChange {
    pub line: SignalLine,
    pub energized: bool,
}

/// Recording signal panel
#[derive(Debug, Default)]
pub struct SimSignals {
    ready: bool,
    active: bool,
    alarm: bool,
    changes: Vec<SignalChange>,
}

impl SimSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every state change, oldest first
    pub fn changes(&self) -> &[SignalChange] {
        &self.changes
    }

    fn record(&mut self, line: SignalLine, current: bool, energized: bool) {
        if current != energized {
            self.changes.push(SignalChange { line, energized });
        }
    }
}

impl SignalOutputs for SimSignals {
    fn set_indicator(&mut self, channel: Indicator, energized: bool) {
        let current = self.indicator(channel);
        self.record(SignalLine::Indicator(channel), current, energized);
        match channel {
            Indicator::Ready => self.ready = energized,
            Indicator::Active => self.active = energized,
        }
    }

    fn set_alarm(&mut self, energized: bool) {
        self.record(SignalLine::Alarm, self.alarm, energized);
        self.alarm = energized;
    }

    fn indicator(&self, channel: Indicator) -> bool {
        match channel {
            Indicator::Ready => self.ready,
            Indicator::Active => self.active,
        }
    }

    fn alarm(&self) -> bool {
        self.alarm
    }
}

/// Stop signal that fires once the virtual clock reaches a deadline
#[derive(Debug, Clone)]
pub struct CancelAt {
    clock: SimClock,
    at_ms: u64,
}

impl CancelAt {
    pub fn new(clock: SimClock, at_ms: u64) -> Self {
        Self { clock, at_ms }
    }
}

impl CancelSignal for CancelAt {
    fn is_cancelled(&self) -> bool {
        self.clock.now_ms() >= self.at_ms
    }
}

/// Execute a plan against the simulated backend
///
/// Returns the report a real run would produce with a fault-free drive
/// and no stop request.
pub fn dry_run(strategy: &Strategy, config: &MachineConfig) -> Result<ExecutionReport, SequencerError> {
    let clock = SimClock::new();
    let mut sequencer = Sequencer::from_config(
        SimActuator::new(),
        SimSignals::new(),
        SimDelay::new(clock.clone()),
        clock,
        config,
    );
    sequencer.run(strategy, &NeverCancel)
}
