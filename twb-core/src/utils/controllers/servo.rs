//! Servo I/O boundary.
//!
//! [`ServoHal`] is the capability the drivetrain needs from the hardware:
//! bind a servo to a numbered pin, write an angle, release it. A
//! [`ServoHandle`] is one bound servo as seen by the drivetrain.

/// Hardware capability to drive hobby servos by pin number.
pub trait ServoHal {
    type Error: core::fmt::Debug;

    /// Start driving the servo on `pin`.
    fn attach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error>;

    /// Command the servo on `pin` to `angle` degrees (0..=180).
    fn write(
        &mut self,
        pin: u8,
        angle: u8,
    ) -> Result<(), Self::Error>;

    /// Stop driving the servo on `pin`.
    fn detach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error>;
}

impl<T: ServoHal + ?Sized> ServoHal for &mut T {
    type Error = T::Error;

    fn attach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        (**self).attach(pin)
    }

    fn write(
        &mut self,
        pin: u8,
        angle: u8,
    ) -> Result<(), Self::Error> {
        (**self).write(pin, angle)
    }

    fn detach(
        &mut self,
        pin: u8,
    ) -> Result<(), Self::Error> {
        (**self).detach(pin)
    }
}

/// One servo bound to a pin, remembering the last angle written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoHandle {
    pin: u8,
    last: Option<u8>,
    attached: bool,
}

impl ServoHandle {
    /// A handle for `pin` that has not been attached yet.
    pub const fn unbound(pin: u8) -> Self {
        Self {
            pin,
            last: None,
            attached: false,
        }
    }

    /// Attach the servo on `pin` through `hal`.
    pub fn bind<H: ServoHal>(
        hal: &mut H,
        pin: u8,
    ) -> Result<Self, H::Error> {
        hal.attach(pin)?;
        tracing::debug!(pin, "servo attached");
        Ok(Self {
            pin,
            last: None,
            attached: true,
        })
    }

    /// Write `angle` and record it as the last command.
    pub fn write<H: ServoHal>(
        &mut self,
        hal: &mut H,
        angle: u8,
    ) -> Result<(), H::Error> {
        hal.write(self.pin, angle)?;
        tracing::debug!(pin = self.pin, angle, "servo write");
        self.last = Some(angle);
        Ok(())
    }

    /// Detach the servo. Releasing an unattached handle does nothing.
    pub fn release<H: ServoHal>(
        &mut self,
        hal: &mut H,
    ) -> Result<(), H::Error> {
        if self.attached {
            hal.detach(self.pin)?;
            self.attached = false;
            tracing::debug!(pin = self.pin, "servo detached");
        }
        Ok(())
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Last angle written, if any.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
