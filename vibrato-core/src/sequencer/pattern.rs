//! Four-phase step sequences and step timing

use crate::traits::{Direction, StepPattern};

/// Clockwise coil sequence (bit i = coil i)
pub const CLOCKWISE: [StepPattern; 4] = [
    StepPattern::new(0b1001),
    StepPattern::new(0b1100),
    StepPattern::new(0b0110),
    StepPattern::new(0b0011),
];

/// Counter-clockwise coil sequence
pub const COUNTER_CLOCKWISE: [StepPattern; 4] = [
    StepPattern::new(0b1001),
    StepPattern::new(0b0011),
    StepPattern::new(0b0110),
    StepPattern::new(0b1100),
];

/// Pattern for the `step`-th step in `direction`
pub fn pattern_for(direction: Direction, step: u32) -> StepPattern {
    let table = match direction {
        Direction::Clockwise => &CLOCKWISE,
        Direction::CounterClockwise => &COUNTER_CLOCKWISE,
    };
    table[(step % 4) as usize]
}

/// Shaft speed for a vibration frequency in tenths of an rpm
///
/// One rpm per 10 Hz, so the tenths value equals the frequency. Clamped to
/// `[min_rpm, max_rpm]`; an inverted range resolves to `max_rpm`.
pub fn adjusted_rpm_x10(freq_hz: u16, min_rpm: u16, max_rpm: u16) -> u32 {
    let min = u32::from(min_rpm) * 10;
    let max = u32::from(max_rpm) * 10;
    u32::from(freq_hz).max(min).min(max)
}

/// Microseconds between steps at `rpm_x10` tenths of an rpm
///
/// Rounded to the nearest microsecond. Returns 0 when either argument is 0.
pub fn step_interval_us(rpm_x10: u32, steps_per_revolution: u16) -> u32 {
    let steps_per_ten_minutes = u64::from(rpm_x10) * u64::from(steps_per_revolution);
    if steps_per_ten_minutes == 0 {
        return 0;
    }
    ((600_000_000 + steps_per_ten_minutes / 2) / steps_per_ten_minutes) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Coil masks from shifting 0x99 across the four pins
    fn legacy_mask(direction: Direction, step: u32) -> u8 {
        let j = step % 4;
        let mut mask = 0;
        for pin in 0..4u32 {
            let bit = match direction {
                Direction::Clockwise => 7 - pin - j,
                Direction::CounterClockwise => 3 - pin + j,
            };
            if (0x99u8 >> bit) & 1 == 1 {
                mask |= 1 << pin;
            }
        }
        mask
    }

    #[test]
    fn test_tables_match_rotation() {
        for step in 0..8 {
            assert_eq!(
                pattern_for(Direction::Clockwise, step).bits(),
                legacy_mask(Direction::Clockwise, step)
            );
            assert_eq!(
                pattern_for(Direction::CounterClockwise, step).bits(),
                legacy_mask(Direction::CounterClockwise, step)
            );
        }
    }

    #[test]
    fn test_two_coils_per_step() {
        for step in 0..4 {
            assert_eq!(CLOCKWISE[step].bits().count_ones(), 2);
            assert_eq!(COUNTER_CLOCKWISE[step].bits().count_ones(), 2);
        }
    }

    #[test]
    fn test_rpm_clamped() {
        assert_eq!(adjusted_rpm_x10(180, 5, 30), 180);
        assert_eq!(adjusted_rpm_x10(185, 5, 30), 185);
        assert_eq!(adjusted_rpm_x10(20, 5, 30), 50);
        assert_eq!(adjusted_rpm_x10(400, 5, 30), 300);
    }

    #[test]
    fn test_inverted_range_does_not_panic() {
        assert_eq!(adjusted_rpm_x10(180, 30, 5), 50);
    }

    #[test]
    fn test_step_interval() {
        // 18 rpm * 2048 = 36864 steps/min
        assert_eq!(step_interval_us(180, 2048), 1628);
        assert_eq!(step_interval_us(300, 2048), 977);
        assert_eq!(step_interval_us(0, 2048), 0);
    }

    #[test]
    fn test_fractional_rpm_interval() {
        // 18.5 rpm: (60 / 18.5) / 2048 s = 1583.6 us
        assert_eq!(step_interval_us(adjusted_rpm_x10(185, 5, 30), 2048), 1584);
        // 20.3 rpm: 1443.2 us
        assert_eq!(step_interval_us(adjusted_rpm_x10(203, 5, 30), 2048), 1443);
    }
}
