//! Servo pulse timing.
//!
//! Hobby servos read the width of a pulse repeated at a fixed frame rate
//! (typically 50 Hz). An angle of 0..=180 degrees maps linearly onto a pulse
//! between `min_pulse_us` and `max_pulse_us`; the PCA9685 expresses that pulse
//! as a count of its 4096 ticks per frame.

use serde::{Deserialize, Serialize};

use super::drive::SERVO_MAX_ANGLE;

/// PCA9685 internal oscillator frequency (Hz).
pub const PCA9685_OSC_HZ: f32 = 25_000_000.0;
/// Ticks per PWM frame on the PCA9685.
pub const PCA9685_TICKS: u32 = 4096;
/// Frame rates the PCA9685 can produce (prescale 255 and 3).
pub const PCA9685_MIN_HZ: u32 = 24;
pub const PCA9685_MAX_HZ: u32 = 1526;

/// Pulse frame rate and width limits for a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoTiming {
    pub frequency_hz: u32,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            frequency_hz: 50,
            min_pulse_us: 544,
            max_pulse_us: 2400,
        }
    }
}

impl ServoTiming {
    /// `frequency_hz` clamped into the range the PCA9685 supports.
    pub fn frequency(&self) -> u32 {
        self.frequency_hz.clamp(PCA9685_MIN_HZ, PCA9685_MAX_HZ)
    }

    /// Length of one PWM frame (µs).
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.frequency()
    }

    /// Pulse width for `angle`, clamped to 180 degrees.
    pub fn pulse_us(
        &self,
        angle: u8,
    ) -> u32 {
        let angle = u32::from(angle.min(SERVO_MAX_ANGLE));
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        self.min_pulse_us + angle * span / u32::from(SERVO_MAX_ANGLE)
    }

    /// PCA9685 OFF tick count producing the pulse for `angle`.
    pub fn ticks(
        &self,
        angle: u8,
    ) -> u16 {
        let ticks = self.pulse_us(angle) * PCA9685_TICKS / self.period_us();
        ticks.min(PCA9685_TICKS - 1) as u16
    }

    /// PCA9685 prescale register value for `frequency_hz`.
    ///
    /// The chip accepts prescale values in `3..=255`.
    pub fn prescale(&self) -> u8 {
        let hz = self.frequency() as f32;
        let raw = libm::roundf(PCA9685_OSC_HZ / (PCA9685_TICKS as f32 * hz)) - 1.0;
        raw.clamp(3.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_endpoints() {
        let t = ServoTiming::default();
        assert_eq!(t.pulse_us(0), 544);
        assert_eq!(t.pulse_us(180), 2400);
        assert_eq!(t.pulse_us(255), 2400);
        assert_eq!(t.pulse_us(90), 1472);
    }

    #[test]
    fn test_ticks_at_50hz() {
        let t = ServoTiming::default();
        assert_eq!(t.period_us(), 20_000);
        assert_eq!(t.ticks(90), 301);
        assert_eq!(t.ticks(100), 322);
    }

    #[test]
    fn test_prescale() {
        assert_eq!(ServoTiming::default().prescale(), 121);
        let t = ServoTiming {
            frequency_hz: 60,
            ..ServoTiming::default()
        };
        assert_eq!(t.prescale(), 101);
    }

    #[test]
    fn test_frequency_out_of_range_is_clamped() {
        let fast = ServoTiming {
            frequency_hz: 2_000_000,
            ..ServoTiming::default()
        };
        assert_eq!(fast.frequency(), PCA9685_MAX_HZ);
        assert_eq!(fast.period_us(), 655);
        assert_eq!(fast.ticks(90), PCA9685_TICKS as u16 - 1);
        assert_eq!(fast.prescale(), 3);

        let slow = ServoTiming {
            frequency_hz: 0,
            ..ServoTiming::default()
        };
        assert_eq!(slow.frequency(), PCA9685_MIN_HZ);
        assert_eq!(slow.period_us(), 41_666);
        assert_eq!(slow.prescale(), 253);
    }
}
