//! Module Exports
//!
//! This file exports the modules that turn motion commands into servo output.
//!
//! - `servo`: the actuator I/O boundary (`ServoHal`) and per-wheel handles.
//! - `pca9685`: `ServoHal` backend for servos wired to a PCA9685 PWM driver.
//! - `drivetrain`: the two-wheel drivetrain and its command dispatch.

pub mod drivetrain;
pub mod pca9685;
pub mod servo;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

pub use drivetrain::{DriveError, DriveState, Drivetrain};
pub use pca9685::{Pca9685Servos, ServoError};
pub use servo::{ServoHal, ServoHandle};

/// Channel used to receive drive commands (`DriveCommand` messages).
pub static DRIVE_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    DriveCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Drive command variants sent by an external transport.
///
/// Serialized as JSON with tag `"dc"`. Durations are milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "dc", rename_all = "snake_case")] // dc = drive command
pub enum DriveCommand {
    /// Step forward `steps` times, driving `ms` per step.
    Forward { steps: i32, ms: u32 },
    /// Step backward `steps` times, driving `ms` per step.
    Backward { steps: i32, ms: u32 },
    /// Single timed forward drive; same as `Forward { steps: 1, ms }`,
    /// settle pause included.
    ForwardFor { ms: u32 },
    /// Single timed backward drive; same as `Backward { steps: 1, ms }`.
    BackwardFor { ms: u32 },
    /// Turn in place to the left for `ms`.
    Left { ms: u32 },
    /// Turn in place to the right for `ms`.
    Right { ms: u32 },
    /// Set the logical speed (0..=100, clamped).
    Speed { v: i32 },
    /// Release both servos.
    Stop,
    /// Rebind the servos; missing pins keep their current value.
    Init { l: Option<u8>, r: Option<u8> },
}

impl DriveCommand {
    /// Decode a JSON encoded command.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
