//! Indicator and alarm output traits

use serde::{Deserialize, Serialize};

/// Indicator channels on the operator panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Probe is in position (green lamp)
    Ready,
    /// Probe is vibrating (red lamp)
    Active,
}

/// Electrical polarity of an output line
///
/// Wiring differs between panels, so every line carries its own polarity
/// instead of assuming high means on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Energized when the pin is high
    #[default]
    ActiveHigh,
    /// Energized when the pin is low
    ActiveLow,
}

impl Polarity {
    /// Pin level (true = high) that produces the requested state
    pub const fn pin_level(self, energized: bool) -> bool {
        match self {
            Polarity::ActiveHigh => energized,
            Polarity::ActiveLow => !energized,
        }
    }
}

/// Trait for indicator lamps and the audible alarm
///
/// Implementations map logical states through the configured [`Polarity`].
pub trait SignalOutputs {
    /// Energize or release an indicator
    fn set_indicator(&mut self, channel: Indicator, energized: bool);

    /// Energize or release the alarm
    fn set_alarm(&mut self, energized: bool);

    /// Logical state of an indicator
    fn indicator(&self, channel: Indicator) -> bool;

    /// Logical state of the alarm
    fn alarm(&self) -> bool;

    /// Release every indicator and the alarm
    fn all_off(&mut self) {
        self.set_indicator(Indicator::Ready, false);
        self.set_indicator(Indicator::Active, false);
        self.set_alarm(false);
    }

    /// Check if any line is energized
    fn any_energized(&self) -> bool {
        self.indicator(Indicator::Ready) || self.indicator(Indicator::Active) || self.alarm()
    }
}
