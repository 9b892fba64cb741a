//! Tunable drive constants.
//!
//! Every value that shapes a motion (neutral angle, drive range, turn offset,
//! settle pause and duration bound) lives in [`DriveConfig`] so a robot can be
//! retuned without touching the drivetrain logic. The struct deserializes with
//! per-field defaults, so a partial JSON document such as
//! `{"settle_ms": 250}` is a valid configuration.

use serde::{Deserialize, Serialize};

/// Servo angle at which a continuous-rotation servo holds still.
pub const DEFAULT_NEUTRAL: u8 = 90;
/// Largest offset from neutral a drive command may use.
pub const DEFAULT_DRIVE_RANGE: u8 = 90;
/// Offset from neutral used for in-place turns.
pub const DEFAULT_TURN_OFFSET: u8 = 10;
/// Pause after each forward/backward step, in milliseconds.
pub const DEFAULT_SETTLE_MS: u32 = 500;
/// Upper bound applied to caller supplied durations, in milliseconds.
pub const DEFAULT_MAX_DURATION_MS: u32 = 10_000;
/// Logical speed (0..=100) applied on initialization.
pub const DEFAULT_SPEED: i32 = 50;

/// Drive tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Stop command for both servos (degrees).
    pub neutral: u8,
    /// Internal drive intensity range; logical speed 0..=100 maps onto 0..=drive_range.
    pub drive_range: u8,
    /// Fixed turn intensity, independent of the speed setting.
    pub turn_offset: u8,
    /// Pause between forward/backward repetitions (ms).
    pub settle_ms: u32,
    /// Caller durations are clamped into 0..=max_duration_ms.
    pub max_duration_ms: u32,
    /// Logical speed set by `initialize`.
    pub default_speed: i32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            neutral: DEFAULT_NEUTRAL,
            drive_range: DEFAULT_DRIVE_RANGE,
            turn_offset: DEFAULT_TURN_OFFSET,
            settle_ms: DEFAULT_SETTLE_MS,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            default_speed: DEFAULT_SPEED,
        }
    }
}

impl DriveConfig {
    /// Clamp a caller supplied duration into the configured bound.
    pub fn clamp_duration(
        &self,
        ms: u32,
    ) -> u32 {
        if ms > self.max_duration_ms {
            tracing::warn!(
                requested = ms,
                bound = self.max_duration_ms,
                "duration clamped"
            );
        }
        ms.min(self.max_duration_ms)
    }
}
