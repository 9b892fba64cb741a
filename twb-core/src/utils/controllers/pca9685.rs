//! PCA9685 servo backend.
//!
//! Drives up to sixteen hobby servos from a PCA9685 PWM driver sharing an I2C
//! bus. A servo's pin number is the PCA9685 channel it is wired to.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::servo::ServoHal;
use crate::utils::math::pulse::ServoTiming;

/// Default I2C address of the PCA9685 board.
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Errors raised by the PCA9685 servo backend.
#[derive(Debug)]
pub enum ServoError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    /// The pin does not name a PCA9685 channel (0..=15).
    InvalidPin(u8),
    /// A write targeted a channel that is not attached.
    NotAttached(u8),
}

/// Map a pin number onto a PCA9685 channel.
fn channel(pin: u8) -> Option<Channel> {
    let ch = match pin {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };
    Some(ch)
}

/// Servo outputs on a PCA9685 over a shared I2C bus.
pub struct Pca9685Servos<'a, I2C: 'static> {
    pwm: Pca9685<RefCellDevice<'a, I2C>>,
    timing: ServoTiming,
    /// Bit n set while channel n is attached.
    attached: u16,
}

impl<'a, I2C, E> Pca9685Servos<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Create a backend for the PCA9685 at `address` on `i2c_bus`.
    ///
    /// No bus traffic happens until `configure` or the first servo write.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        address: u8,
        timing: ServoTiming,
    ) -> Result<Self, ServoError<E>> {
        let pwm = Pca9685::new(RefCellDevice::new(i2c_bus), PwmAddress::from(address))
            .map_err(ServoError::PwmError)?;
        Ok(Self {
            pwm,
            timing,
            attached: 0,
        })
    }

    /// Enable the chip and set the prescale for the servo frame rate.
    pub fn configure(&mut self) -> Result<(), ServoError<E>> {
        self.pwm.enable().map_err(ServoError::PwmError)?;
        tracing::info!("PWM enabled");
        let prescale = self.timing.prescale();
        self.pwm
            .set_prescale(prescale)
            .map_err(ServoError::PwmError)?;
        tracing::info!(
            prescale,
            hz = self.timing.frequency(),
            "PWM prescale set"
        );
        Ok(())
    }

    /// Put the chip to sleep; all outputs stop.
    pub fn disable(&mut self) -> Result<(), ServoError<E>> {
        self.pwm.disable().map_err(ServoError::PwmError)
    }

    pub fn timing(&self) -> &ServoTiming {
        &self.timing
    }

    fn is_attached(
        &self,
        pin: u8,
    ) -> bool {
        self.attached & (1 << pin) != 0
    }
}

impl<I2C, E> ServoHal for Pca9685Servos<'_, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = ServoError<E>;

    fn attach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        channel(pin).ok_or(ServoError::InvalidPin(pin))?;
        self.attached |= 1 << pin;
        Ok(())
    }

    fn write(
        &mut self,
        pin: u8,
        angle: u8,
    ) -> Result<(), Self::Error> {
        let ch = channel(pin).ok_or(ServoError::InvalidPin(pin))?;
        if !self.is_attached(pin) {
            return Err(ServoError::NotAttached(pin));
        }
        let ticks = self.timing.ticks(angle);
        self.pwm
            .set_channel_on_off(ch, 0, ticks)
            .map_err(ServoError::PwmError)
    }

    /// A zero width pulse lets the servo go limp.
    fn detach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        let ch = channel(pin).ok_or(ServoError::InvalidPin(pin))?;
        self.pwm
            .set_channel_on_off(ch, 0, 0)
            .map_err(ServoError::PwmError)?;
        self.attached &= !(1 << pin);
        Ok(())
    }
}
