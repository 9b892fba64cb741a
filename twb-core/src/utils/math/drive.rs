//! Differential drive mixing for two continuous-rotation servos.
//!
//! A continuous-rotation servo treats its angle command as a velocity: the
//! neutral angle stops it, offsets on either side spin it in opposite
//! directions. The two servos are mounted mirrored, so driving straight needs
//! opposite offsets while an in-place turn needs the same offset on both.
//!
//! # Example
//! ```rust
//! use twb_core::utils::math::drive::{rescale_speed, wheel_commands, Motion};
//! let speed = rescale_speed(50, 90);
//! let cmds = wheel_commands(Motion::Forward, 90, speed);
//! assert_eq!((cmds.left, cmds.right), (45, 135));
//! ```

/// Largest angle a servo accepts.
pub const SERVO_MAX_ANGLE: u8 = 180;
/// Upper end of the logical speed domain.
pub const SPEED_MAX: i32 = 100;

/// Direction of a timed motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Forward,
    Backward,
    TurnRight,
    TurnLeft,
}

/// A pair of servo angle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommands {
    pub left: u8,
    pub right: u8,
}

impl WheelCommands {
    /// Both servos held at `neutral`.
    pub const fn neutral(neutral: u8) -> Self {
        Self {
            left: neutral,
            right: neutral,
        }
    }
}

/// Clamp a logical speed into `0..=100` and map it linearly onto `0..=drive_range`.
///
/// Integer arithmetic truncates, so `rescale_speed(50, 90)` is 45 and
/// `rescale_speed(1, 90)` is 0.
pub fn rescale_speed(
    value: i32,
    drive_range: u8,
) -> u8 {
    let v = value.clamp(0, SPEED_MAX);
    (v * i32::from(drive_range) / SPEED_MAX) as u8
}

/// Offset `neutral` by `delta`, saturating at the servo's angle limits.
fn offset(
    neutral: u8,
    delta: i16,
) -> u8 {
    (i16::from(neutral) + delta).clamp(0, i16::from(SERVO_MAX_ANGLE)) as u8
}

/// Compute left/right commands for `motion` at the given intensity.
///
/// Forward spins the right servo above neutral and the left below; backward
/// swaps them. Turns apply the same offset to both (right above neutral,
/// left below).
pub fn wheel_commands(
    motion: Motion,
    neutral: u8,
    magnitude: u8,
) -> WheelCommands {
    let m = i16::from(magnitude);
    let (left, right) = match motion {
        Motion::Forward => (-m, m),
        Motion::Backward => (m, -m),
        Motion::TurnRight => (m, m),
        Motion::TurnLeft => (-m, -m),
    };
    WheelCommands {
        left: offset(neutral, left),
        right: offset(neutral, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_speed_clamps() {
        assert_eq!(rescale_speed(150, 90), 90);
        assert_eq!(rescale_speed(-5, 90), 0);
        assert_eq!(rescale_speed(50, 90), 45);
        assert_eq!(rescale_speed(100, 90), 90);
        assert_eq!(rescale_speed(i32::MIN, 90), 0);
        assert_eq!(rescale_speed(i32::MAX, 90), 90);
    }

    #[test]
    fn test_forward_backward_are_mirrored() {
        for speed in [0u8, 1, 45, 90] {
            let fwd = wheel_commands(Motion::Forward, 90, speed);
            let back = wheel_commands(Motion::Backward, 90, speed);
            assert_eq!(fwd.left, back.right);
            assert_eq!(fwd.right, back.left);
        }
    }

    #[test]
    fn test_turns_share_direction() {
        let right = wheel_commands(Motion::TurnRight, 90, 10);
        let left = wheel_commands(Motion::TurnLeft, 90, 10);
        assert_eq!(right, WheelCommands { left: 100, right: 100 });
        assert_eq!(left, WheelCommands { left: 80, right: 80 });
    }

    #[test]
    fn test_offset_saturates() {
        let cmds = wheel_commands(Motion::Forward, 170, 90);
        assert_eq!(cmds.right, SERVO_MAX_ANGLE);
        assert_eq!(cmds.left, 80);
        let cmds = wheel_commands(Motion::Backward, 10, 90);
        assert_eq!(cmds.right, 0);
    }
}
