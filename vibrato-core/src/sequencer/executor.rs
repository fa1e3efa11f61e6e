//! Plan executor
//!
//! Walks the points of a [`Strategy`] in order, driving the signal panel and
//! the probe drive through APPROACH, READY, ACTIVE and SETTLE for each one.
//!
//! Waits are blocking (`DelayNs`): the drive needs exact inter-step timing.
//! The stop signal is polled once per step while ACTIVE and between
//! `poll_slice_ms` slices of every other dwell. Whatever happens, the run
//! ends with every output de-energized.

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use super::pattern::{adjusted_rpm_x10, pattern_for, step_interval_us};
use super::phase::{Phase, PhaseEvent};
use super::report::{
    ExecutionReport, PhaseTimestamps, PointFault, PointLog, PointStatus, RunOutcome,
};
use crate::config::{MachineConfig, SequencerConfig, StepperConfig};
use crate::plan::{Point, Strategy};
use crate::traits::{
    ActuatorError, CancelSignal, Clock, CoilActuator, Direction, Indicator, SignalOutputs,
};

/// Errors that end a run before any point is visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerError {
    /// Probe drive failed to initialize
    ActuatorInit(ActuatorError),
}

/// Progress of the current ACTIVE phase (diagnostic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveProgress {
    pub elapsed_ms: u64,
    pub total_ms: u64,
}

impl ActiveProgress {
    /// Completion percentage, 0..=100
    pub fn percent(&self) -> u8 {
        if self.total_ms == 0 {
            return 100;
        }
        (self.elapsed_ms.saturating_mul(100) / self.total_ms).min(100) as u8
    }
}

/// Observable state of the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExecutionState {
    /// Index into the plan's point list
    pub current_point_index: usize,
    pub phase: Phase,
    pub direction: Direction,
    pub running: bool,
    pub stop_requested: bool,
    pub progress: Option<ActiveProgress>,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            current_point_index: 0,
            phase: Phase::Idle,
            direction: Direction::Clockwise,
            running: false,
            stop_requested: false,
            progress: None,
        }
    }
}

/// How the ACTIVE phase of a point ended
enum Vibration {
    Completed,
    Cancelled,
}

/// Plan executor
///
/// Owns the output lines for its whole lifetime; nothing else may drive
/// them while a run is in progress.
pub struct Sequencer<A, S, D, C> {
    actuator: A,
    signals: S,
    delay: D,
    clock: C,
    config: SequencerConfig,
    stepper: StepperConfig,
    state: ExecutionState,
}

impl<A, S, D, C> Sequencer<A, S, D, C>
where
    A: CoilActuator,
    S: SignalOutputs,
    D: DelayNs,
    C: Clock,
{
    pub fn new(
        actuator: A,
        signals: S,
        delay: D,
        clock: C,
        config: SequencerConfig,
        stepper: StepperConfig,
    ) -> Self {
        Self {
            actuator,
            signals,
            delay,
            clock,
            config,
            stepper,
            state: ExecutionState::default(),
        }
    }

    /// Create a sequencer from the machine configuration
    pub fn from_config(actuator: A, signals: S, delay: D, clock: C, config: &MachineConfig) -> Self {
        Self::new(actuator, signals, delay, clock, config.sequencer, config.stepper)
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn signals(&self) -> &S {
        &self.signals
    }

    /// Check that no coil, indicator or alarm is energized
    pub fn outputs_de_energized(&self) -> bool {
        !self.actuator.is_energized() && !self.signals.any_energized()
    }

    /// Release the hardware
    pub fn into_parts(self) -> (A, S, D, C) {
        (self.actuator, self.signals, self.delay, self.clock)
    }

    /// Execute a plan
    ///
    /// Runs at most `point_cap` points. A point whose drive faults is marked
    /// failed and the run continues; a stop request ends the run after the
    /// current point with a partial report. Only a drive that cannot be
    /// initialized fails the run.
    pub fn run<X>(&mut self, strategy: &Strategy, cancel: &X) -> Result<ExecutionReport, SequencerError>
    where
        X: CancelSignal + ?Sized,
    {
        self.state = ExecutionState::default();
        self.force_safe();

        if let Err(e) = self.actuator.init() {
            #[cfg(feature = "defmt")]
            defmt::error!("Actuator init failed: {}", e);

            self.force_safe();
            self.state.phase = Phase::Aborted;
            return Err(SequencerError::ActuatorInit(e));
        }

        let planned = self.config.point_cap.min(strategy.points.len());
        let mut entries = Vec::with_capacity(planned);
        let mut aborted = false;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Run start: {} of {} points (cap {})",
            planned,
            strategy.points.len(),
            self.config.point_cap
        );

        self.state.running = true;
        self.fire(if planned > 0 {
            PhaseEvent::Start
        } else {
            PhaseEvent::Finish
        });

        for (index, point) in strategy.points.iter().take(planned).enumerate() {
            self.state.current_point_index = index;
            self.state.direction = Direction::for_point(index);

            let (entry, stop) = self.run_point(point, cancel);
            entries.push(entry);

            if stop {
                aborted = true;
                break;
            }
            if index + 1 < planned {
                self.fire(PhaseEvent::Settled);
            }
        }

        if aborted {
            self.fire(PhaseEvent::Cancel);
        } else if planned > 0 {
            self.signal_completion(cancel);
            self.fire(PhaseEvent::Finish);
        }

        self.force_safe();
        self.state.running = false;

        let outcome = if aborted {
            RunOutcome::Aborted
        } else if entries.iter().any(|e: &PointLog| e.status == PointStatus::Failed) {
            RunOutcome::CompletedWithFailures
        } else {
            RunOutcome::Completed
        };

        #[cfg(feature = "defmt")]
        defmt::info!("Run finished: {} after {} points", outcome, entries.len());

        Ok(ExecutionReport {
            outcome,
            planned_points: planned,
            point_cap: self.config.point_cap,
            entries,
            finished_ms: self.clock.now_ms(),
        })
    }

    /// Execute one point, entered in APPROACH
    ///
    /// Returns the log entry and whether the run must stop.
    fn run_point<X>(&mut self, point: &Point, cancel: &X) -> (PointLog, bool)
    where
        X: CancelSignal + ?Sized,
    {
        let direction = self.state.direction;
        let mut entry = PointLog {
            id: point.id,
            direction,
            status: PointStatus::Completed,
            phase_timestamps: PhaseTimestamps::default(),
            steps: 0,
            error: None,
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Point {}: ({}, {}) {} Hz for {} s at {} cm, {}",
            point.id,
            point.x,
            point.y,
            point.freq_hz,
            point.time_s,
            point.depth_cm,
            direction
        );

        // APPROACH
        entry.phase_timestamps.approach_ms = Some(self.clock.now_ms());
        self.force_safe();
        if self.dwell(self.config.approach_ms, cancel) {
            return self.abort_point(entry);
        }

        // READY
        self.fire(PhaseEvent::Arrived);
        entry.phase_timestamps.ready_ms = Some(self.clock.now_ms());
        self.signals.set_indicator(Indicator::Ready, true);
        if self.dwell(self.config.ready_ms, cancel) {
            return self.abort_point(entry);
        }

        // ACTIVE
        self.fire(PhaseEvent::Readied);
        entry.phase_timestamps.active_ms = Some(self.clock.now_ms());
        self.signals.set_indicator(Indicator::Ready, false);
        self.signals.set_indicator(Indicator::Active, true);
        self.signals.set_alarm(true);

        match self.vibrate(point, direction, cancel, &mut entry.steps) {
            Ok(Vibration::Completed) => self.fire(PhaseEvent::Vibrated),
            Ok(Vibration::Cancelled) => return self.abort_point(entry),
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Point {} failed after {} steps: {}", point.id, entry.steps, e);

                self.force_safe();
                entry.status = PointStatus::Failed;
                entry.error = Some(PointFault::Actuator(e));
                self.fire(PhaseEvent::Fault);
            }
        }

        // SETTLE
        entry.phase_timestamps.settle_ms = Some(self.clock.now_ms());
        self.force_safe();
        let stop = self.dwell(self.config.settle_ms, cancel);
        entry.phase_timestamps.finished_ms = Some(self.clock.now_ms());

        (entry, stop)
    }

    /// Step the drive for the point's vibration time
    fn vibrate<X>(
        &mut self,
        point: &Point,
        direction: Direction,
        cancel: &X,
        steps: &mut u32,
    ) -> Result<Vibration, ActuatorError>
    where
        X: CancelSignal + ?Sized,
    {
        let rpm_x10 = adjusted_rpm_x10(point.freq_hz, self.stepper.min_rpm, self.stepper.max_rpm);
        let interval_us = step_interval_us(rpm_x10, self.stepper.steps_per_revolution).max(1);
        let total_us = u64::from(point.time_s) * 1_000_000;
        let total_ms = total_us / 1000;
        let start_us = self.clock.now_us();

        #[cfg(feature = "defmt")]
        let mut logged_s = 0u64;

        self.state.progress = Some(ActiveProgress {
            elapsed_ms: 0,
            total_ms,
        });

        loop {
            if cancel.is_cancelled() {
                self.state.stop_requested = true;
                self.force_safe();
                return Ok(Vibration::Cancelled);
            }

            let elapsed_us = self.clock.now_us().saturating_sub(start_us);
            if elapsed_us >= total_us {
                break;
            }

            self.actuator.step(pattern_for(direction, *steps))?;
            *steps += 1;
            self.delay.delay_us(interval_us);

            let progress = ActiveProgress {
                elapsed_ms: (elapsed_us / 1000).min(total_ms),
                total_ms,
            };

            #[cfg(feature = "defmt")]
            if elapsed_us / 1_000_000 > logged_s {
                logged_s = elapsed_us / 1_000_000;
                defmt::debug!("Vibrating: {}% ({} steps)", progress.percent(), *steps);
            }

            self.state.progress = Some(progress);
        }

        self.actuator.shutdown();
        self.state.progress = None;
        Ok(Vibration::Completed)
    }

    /// Light the ready lamp once every point is done
    fn signal_completion<X>(&mut self, cancel: &X)
    where
        X: CancelSignal + ?Sized,
    {
        if self.config.completion_flash_ms == 0 {
            return;
        }
        self.signals.set_indicator(Indicator::Ready, true);
        // A stop here only shortens the flash
        self.dwell(self.config.completion_flash_ms, cancel);
        self.signals.set_indicator(Indicator::Ready, false);
    }

    fn abort_point(&mut self, mut entry: PointLog) -> (PointLog, bool) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Stop requested during point {} ({})", entry.id, self.state.phase);

        self.force_safe();
        entry.status = PointStatus::Aborted;
        entry.phase_timestamps.finished_ms = Some(self.clock.now_ms());
        (entry, true)
    }

    /// Blocking wait that polls the stop signal between slices
    ///
    /// Returns true if a stop was requested.
    fn dwell<X>(&mut self, duration_ms: u32, cancel: &X) -> bool
    where
        X: CancelSignal + ?Sized,
    {
        let slice_ms = self.config.poll_slice_ms.max(1);
        let mut remaining = duration_ms;

        loop {
            if cancel.is_cancelled() {
                self.state.stop_requested = true;
                return true;
            }
            if remaining == 0 {
                return false;
            }
            let wait = remaining.min(slice_ms);
            self.delay.delay_ms(wait);
            remaining -= wait;
        }
    }

    fn fire(&mut self, event: PhaseEvent) {
        let next = self.state.phase.transition(event);

        #[cfg(feature = "defmt")]
        if next != self.state.phase {
            defmt::info!("Phase {} -> {} ({})", self.state.phase, next, event);
        }

        self.state.phase = next;
    }

    /// Release every output
    fn force_safe(&mut self) {
        self.actuator.shutdown();
        self.signals.all_off();
        self.state.progress = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Point, SlabGeometry};
    use crate::sim::{CancelAt, SimActuator, SimClock, SimDelay, SimSignals};
    use crate::traits::{NeverCancel, StepPattern};
    use alloc::vec;

    fn plan(count: u32, time_s: u16) -> Strategy {
        plan_at(count, time_s, 180)
    }

    fn plan_at(count: u32, time_s: u16, freq_hz: u16) -> Strategy {
        let points: Vec<Point> = (1..=count)
            .map(|id| Point {
                id,
                x: 0.0,
                y: 0.0,
                freq_hz,
                time_s,
                depth_cm: 25.0,
                radius_cm: 25.0,
            })
            .collect();
        let total_points = points.len();

        Strategy {
            board_info: SlabGeometry::default(),
            material_info: crate::plan::MaterialSummary {
                aggregate_type: Default::default(),
                water_cement_ratio: 0.5,
                aggregate_size_mm: 20.0,
                viscosity_pas: 40.0,
            },
            environment_info: Default::default(),
            vibration_params: crate::plan::VibrationParams {
                power_kw: 2.0,
                base_freq_hz: 180,
                base_time_s: time_s,
                base_depth_cm: 40.0,
                base_radius_cm: 25.0,
            },
            points,
            total_points,
            estimated_time_min: 0.0,
        }
    }

    fn sequencer(
        clock: &SimClock,
        actuator: SimActuator,
    ) -> Sequencer<SimActuator, SimSignals, SimDelay, SimClock> {
        Sequencer::new(
            actuator,
            SimSignals::new(),
            SimDelay::new(clock.clone()),
            clock.clone(),
            SequencerConfig::default(),
            StepperConfig::default(),
        )
    }

    #[test]
    fn test_runs_capped_points() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());

        let report = seq.run(&plan(8, 1), &NeverCancel).unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.planned_points, 5);
        assert_eq!(report.entries.len(), 5);
        assert_eq!(seq.state().phase, Phase::Done);
        assert!(!seq.state().running);
        assert!(seq.outputs_de_energized());
    }

    #[test]
    fn test_directions_alternate() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let report = seq.run(&plan(3, 1), &NeverCancel).unwrap();

        let directions: Vec<Direction> = report.entries.iter().map(|e| e.direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Clockwise,
                Direction::CounterClockwise,
                Direction::Clockwise
            ]
        );
    }

    #[test]
    fn test_step_count_follows_interval() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let report = seq.run(&plan(1, 1), &NeverCancel).unwrap();

        // 18 rpm: 1628 us per step, 1 s of vibration
        let expected = 1_000_000u32.div_ceil(1628);
        assert_eq!(report.entries[0].steps, expected);

        let (actuator, ..) = seq.into_parts();
        assert_eq!(actuator.patterns()[0], StepPattern::new(0b1001));
        assert_eq!(actuator.patterns()[1], StepPattern::new(0b1100));
    }

    #[test]
    fn test_fractional_rpm_step_count() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let report = seq.run(&plan_at(1, 1, 185), &NeverCancel).unwrap();

        // 18.5 rpm: 1584 us per step
        assert_eq!(report.entries[0].steps, 1_000_000u32.div_ceil(1584));
        assert_eq!(report.entries[0].steps, 632);
    }

    #[test]
    fn test_inverted_rpm_range_runs() {
        let clock = SimClock::new();
        let stepper = StepperConfig {
            min_rpm: 30,
            max_rpm: 5,
            ..StepperConfig::default()
        };
        let mut seq = Sequencer::new(
            SimActuator::new(),
            SimSignals::new(),
            SimDelay::new(clock.clone()),
            clock.clone(),
            SequencerConfig::default(),
            stepper,
        );

        let report = seq.run(&plan(1, 1), &NeverCancel).unwrap();

        // Falls back to max_rpm: 5 rpm is 5859 us per step
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.entries[0].steps, 1_000_000u32.div_ceil(5859));
    }

    #[test]
    fn test_phase_timestamps() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let report = seq.run(&plan(1, 2), &NeverCancel).unwrap();

        let ts = report.entries[0].phase_timestamps;
        assert_eq!(ts.approach_ms, Some(0));
        assert_eq!(ts.ready_ms, Some(3000));
        assert_eq!(ts.active_ms, Some(6000));
        let settle = ts.settle_ms.unwrap();
        assert!((8000..8010).contains(&settle));
        assert_eq!(ts.finished_ms, Some(settle + 1000));
        assert_eq!(report.finished_ms, settle + 1000 + 3000);
    }

    #[test]
    fn test_step_fault_moves_on() {
        let clock = SimClock::new();
        // Point 1 takes 615 steps; fail the 11th step of point 2
        let actuator = SimActuator::new().fail_step_at(625);
        let mut seq = sequencer(&clock, actuator);

        let report = seq.run(&plan(3, 1), &NeverCancel).unwrap();

        assert_eq!(report.outcome, RunOutcome::CompletedWithFailures);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[1].status, PointStatus::Failed);
        assert_eq!(
            report.entries[1].error,
            Some(PointFault::Actuator(ActuatorError::Pin))
        );
        assert_eq!(report.entries[2].status, PointStatus::Completed);
        assert!(seq.outputs_de_energized());
    }

    #[test]
    fn test_init_failure_is_fatal() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new().fail_init());

        let result = seq.run(&plan(3, 1), &NeverCancel);

        assert_eq!(
            result,
            Err(SequencerError::ActuatorInit(ActuatorError::Pin))
        );
        assert_eq!(seq.state().phase, Phase::Aborted);
        assert!(seq.outputs_de_energized());
        assert_eq!(seq.actuator().patterns().len(), 0);
    }

    #[test]
    fn test_cancel_during_approach() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let cancel = CancelAt::new(clock.clone(), 1_500);

        let report = seq.run(&plan(3, 1), &cancel).unwrap();

        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, PointStatus::Aborted);
        assert_eq!(report.entries[0].phase_timestamps.ready_ms, None);
        assert!(seq.state().stop_requested);
        assert!(seq.outputs_de_energized());
    }

    #[test]
    fn test_cancel_during_settle_keeps_status() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        // Point 1: approach 0-3 s, ready 3-6 s, active 6-7 s, settle 7-8 s
        let cancel = CancelAt::new(clock.clone(), 7_500);

        let report = seq.run(&plan(3, 1), &cancel).unwrap();

        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, PointStatus::Completed);
        assert_eq!(seq.state().phase, Phase::Aborted);
    }

    #[test]
    fn test_empty_plan() {
        let clock = SimClock::new();
        let mut seq = sequencer(&clock, SimActuator::new());
        let report = seq.run(&plan(0, 1), &NeverCancel).unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(report.entries.is_empty());
        assert_eq!(seq.state().phase, Phase::Done);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_progress_percent() {
        let progress = ActiveProgress {
            elapsed_ms: 2500,
            total_ms: 10_000,
        };
        assert_eq!(progress.percent(), 25);
        assert_eq!(
            ActiveProgress {
                elapsed_ms: 0,
                total_ms: 0
            }
            .percent(),
            100
        );
    }
}
