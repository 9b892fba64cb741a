//! Core drivers and utilities for the Two-Wheel servo Bot on no-std embedded platforms.
//!
//! For a runnable host simulation, see the `twb-app/mock-mcu` crate.
#![no_std]

pub mod utils;
