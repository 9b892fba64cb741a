//! Utility re-exports and helper macros for the Two-Wheel servo Bot.
//!
//! - `config`: tunable drive constants
//! - `controllers`: the drivetrain, the servo I/O boundary and its PCA9685 backend
//! - `math`: speed rescaling, wheel command mixing and servo pulse timing
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod config;
pub mod controllers;
pub mod math;

pub use config::DriveConfig;
pub use controllers::{DriveCommand, DriveError, Drivetrain, DRIVE_CHANNEL};
pub use embassy_time::Delay;
pub use math::drive::WheelCommands;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
