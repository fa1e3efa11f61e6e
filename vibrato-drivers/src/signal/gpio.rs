//! GPIO lamps and buzzer
//!
//! Each panel line is a GPIO pin with its own polarity. Some panels wire
//! the buzzer in parallel with the red lamp; [`SignalPanel::shared`]
//! drives that single line whenever either output is requested.

use embedded_hal::digital::OutputPin;
use vibrato_core::config::SignalConfig;
use vibrato_core::traits::{Indicator, Polarity, SignalOutputs};

/// One panel output on a GPIO pin
pub struct GpioSignalLine<P> {
    pin: P,
    polarity: Polarity,
    /// Logical state (true = energized)
    on: bool,
}

impl<P: OutputPin> GpioSignalLine<P> {
    /// Create a line and force it off
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut line = Self {
            pin,
            polarity,
            on: true,
        };
        line.set(false);
        line
    }

    /// Energize or release the line
    ///
    /// The logical state only follows when the pin write succeeds.
    pub fn set(&mut self, energized: bool) {
        let result = if self.polarity.pin_level(energized) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.on = energized,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Panel line write failed");
            }
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

/// Ready lamp, active lamp and alarm on GPIO lines
pub struct SignalPanel<P> {
    ready: GpioSignalLine<P>,
    active: GpioSignalLine<P>,
    /// Dedicated alarm line, `None` when it shares the active lamp's line
    alarm: Option<GpioSignalLine<P>>,
    active_requested: bool,
    alarm_requested: bool,
}

impl<P: OutputPin> SignalPanel<P> {
    /// Panel with a dedicated alarm line
    pub fn new(ready: P, active: P, alarm: P, config: &SignalConfig) -> Self {
        Self {
            ready: GpioSignalLine::new(ready, config.ready_polarity),
            active: GpioSignalLine::new(active, config.active_polarity),
            alarm: Some(GpioSignalLine::new(alarm, config.alarm_polarity)),
            active_requested: false,
            alarm_requested: false,
        }
    }

    /// Panel whose buzzer is wired to the active lamp's line
    pub fn shared(ready: P, active: P, config: &SignalConfig) -> Self {
        Self {
            ready: GpioSignalLine::new(ready, config.ready_polarity),
            active: GpioSignalLine::new(active, config.active_polarity),
            alarm: None,
            active_requested: false,
            alarm_requested: false,
        }
    }

    /// Build from configuration, sharing the line when `shared_alarm` is set
    ///
    /// The alarm pin is dropped unused on a shared panel.
    pub fn from_config(ready: P, active: P, alarm: Option<P>, config: &SignalConfig) -> Self {
        match alarm {
            Some(alarm) if !config.shared_alarm => Self::new(ready, active, alarm, config),
            _ => Self::shared(ready, active, config),
        }
    }

    pub fn is_shared(&self) -> bool {
        self.alarm.is_none()
    }

    fn refresh_active(&mut self) {
        let energized = match self.alarm {
            Some(_) => self.active_requested,
            None => self.active_requested || self.alarm_requested,
        };
        self.active.set(energized);
    }
}

impl<P: OutputPin> SignalOutputs for SignalPanel<P> {
    fn set_indicator(&mut self, channel: Indicator, energized: bool) {
        match channel {
            Indicator::Ready => self.ready.set(energized),
            Indicator::Active => {
                self.active_requested = energized;
                self.refresh_active();
            }
        }
    }

    fn set_alarm(&mut self, energized: bool) {
        self.alarm_requested = energized;
        match self.alarm.as_mut() {
            Some(line) => line.set(energized),
            None => self.refresh_active(),
        }
    }

    fn indicator(&self, channel: Indicator) -> bool {
        match channel {
            Indicator::Ready => self.ready.is_on(),
            Indicator::Active => self.active_requested && self.active.is_on(),
        }
    }

    fn alarm(&self) -> bool {
        match &self.alarm {
            Some(line) => line.is_on(),
            None => self.alarm_requested && self.active.is_on(),
        }
    }

    fn any_energized(&self) -> bool {
        self.ready.is_on() || self.active.is_on() || self.alarm.as_ref().is_some_and(|l| l.is_on())
    }
}
