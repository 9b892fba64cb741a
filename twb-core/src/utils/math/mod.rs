//! Math utilities for the Two-Wheel servo Bot.
//!
//! - `drive`: logical speed rescaling and left/right command mixing
//! - `pulse`: servo angle to PWM pulse width and PCA9685 tick conversion

pub mod drive;
pub mod pulse;
