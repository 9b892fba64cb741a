//! Two-wheel drivetrain on continuous-rotation servos.
//!
//! Motions are open-loop timed pulses: command both servos, hold, return to
//! neutral. Every pause blocks the caller through the injected `DelayNs`.
//! Numeric inputs are clamped, never rejected; the only refused operation is
//! a motion after [`Drivetrain::stop`], which fails with
//! [`DriveError::NotInitialized`] until [`Drivetrain::initialize`] runs again.

use embedded_hal::delay::DelayNs;

use super::{servo::ServoHal, servo::ServoHandle, DriveCommand, DRIVE_CHANNEL};
use crate::utils::{
    config::DriveConfig,
    math::drive::{rescale_speed, wheel_commands, Motion, WheelCommands, SPEED_MAX},
};

/// Errors returned by drivetrain operations.
#[derive(Debug, PartialEq, Eq)]
pub enum DriveError<E> {
    /// The servos were released by `stop` and not bound again.
    NotInitialized,
    /// The servo backend failed.
    Actuator(E),
}

/// Lifecycle of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    /// Servos bound; motions are accepted.
    Active,
    /// Servos released; only `initialize` recovers.
    Stopped,
}

/// Two servos, a speed setting and the timing source that paces them.
pub struct Drivetrain<H, D>
where
    H: ServoHal,
    D: DelayNs,
{
    hal: H,
    delay: D,
    left: ServoHandle,
    right: ServoHandle,
    /// Drive intensity in `0..=config.drive_range`.
    speed: u8,
    config: DriveConfig,
    state: DriveState,
}

impl<H, D> Drivetrain<H, D>
where
    H: ServoHal,
    D: DelayNs,
{
    /// Bind both servos, hold them at neutral and apply the default speed.
    pub fn new(
        hal: H,
        delay: D,
        left_pin: u8,
        right_pin: u8,
        config: DriveConfig,
    ) -> Result<Self, DriveError<H::Error>> {
        let mut drivetrain = Drivetrain {
            hal,
            delay,
            left: ServoHandle::unbound(left_pin),
            right: ServoHandle::unbound(right_pin),
            speed: 0,
            config,
            state: DriveState::Stopped,
        };
        drivetrain.initialize(left_pin, right_pin)?;
        Ok(drivetrain)
    }

    /// (Re)bind the servos to `left_pin`/`right_pin`.
    ///
    /// Servos still attached are released first. On failure the drivetrain
    /// stays `Stopped` with both servos released.
    pub fn initialize(
        &mut self,
        left_pin: u8,
        right_pin: u8,
    ) -> Result<(), DriveError<H::Error>> {
        if self.any_attached() {
            self.release()?;
        }
        self.state = DriveState::Stopped;

        self.left = ServoHandle::bind(&mut self.hal, left_pin).map_err(DriveError::Actuator)?;
        self.right = match ServoHandle::bind(&mut self.hal, right_pin) {
            Ok(handle) => handle,
            Err(e) => {
                if let Err(err) = self.left.release(&mut self.hal) {
                    tracing::warn!(?err, "failed to release left servo after bind error");
                }
                return Err(DriveError::Actuator(e));
            }
        };
        if let Err(e) = self.hold_neutral() {
            if let Err(err) = self.release() {
                tracing::warn!(?err, "failed to release servos after neutral write error");
            }
            return Err(e);
        }
        self.state = DriveState::Active;
        self.set_speed(self.config.default_speed);

        tracing::info!(left_pin, right_pin, speed = self.speed, "drivetrain initialized");
        Ok(())
    }

    /// Clamp `value` into `0..=100`, rescale it onto the drive range and store it.
    ///
    /// Returns the stored drive intensity.
    pub fn set_speed(
        &mut self,
        value: i32,
    ) -> u8 {
        if !(0..=SPEED_MAX).contains(&value) {
            tracing::warn!(value, "speed clamped into 0..=100");
        }
        self.speed = rescale_speed(value, self.config.drive_range);
        self.speed
    }

    /// Drive forward `steps` times for `ms` each, settling between steps.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn move_forward(
        &mut self,
        steps: i32,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.step(Motion::Forward, steps, ms)
    }

    /// Drive backward `steps` times for `ms` each, settling between steps.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn move_backward(
        &mut self,
        steps: i32,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.step(Motion::Backward, steps, ms)
    }

    /// Spin in place to the right for `ms`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn turn_right(
        &mut self,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.turn(Motion::TurnRight, ms)
    }

    /// Spin in place to the left for `ms`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn turn_left(
        &mut self,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.turn(Motion::TurnLeft, ms)
    }

    /// Release both servos.
    ///
    /// Stopping a stopped drivetrain does nothing, unless an earlier release
    /// failed and left a servo attached; that servo is released again.
    pub fn stop(&mut self) -> Result<(), DriveError<H::Error>> {
        if self.state == DriveState::Stopped && !self.any_attached() {
            tracing::debug!("drivetrain already stopped");
            return Ok(());
        }
        self.release()?;
        tracing::info!("drivetrain stopped");
        Ok(())
    }

    /// Execute a single `DriveCommand`.
    pub fn execute_command(
        &mut self,
        command: DriveCommand,
    ) -> Result<(), DriveError<H::Error>> {
        match command {
            DriveCommand::Forward { steps, ms } => self.move_forward(steps, ms),
            DriveCommand::Backward { steps, ms } => self.move_backward(steps, ms),
            DriveCommand::ForwardFor { ms } => self.move_forward(1, ms),
            DriveCommand::BackwardFor { ms } => self.move_backward(1, ms),
            DriveCommand::Left { ms } => self.turn_left(ms),
            DriveCommand::Right { ms } => self.turn_right(ms),
            DriveCommand::Speed { v } => {
                self.set_speed(v);
                Ok(())
            }
            DriveCommand::Stop => self.stop(),
            DriveCommand::Init { l, r } => {
                let left = l.unwrap_or(self.left.pin());
                let right = r.unwrap_or(self.right.pin());
                self.initialize(left, right)
            }
        }
    }

    /// Receive commands from `DRIVE_CHANNEL` and execute them, forever.
    pub async fn drive_ch(&mut self) -> ! {
        loop {
            let command = DRIVE_CHANNEL.receiver().receive().await;
            tracing::info!("Received drive command: {:?}", command);
            match self.execute_command(command) {
                Ok(()) => tracing::info!("drive command executed successfully"),
                Err(DriveError::NotInitialized) => {
                    tracing::warn!("drive command rejected, drivetrain stopped: {:?}", command)
                }
                Err(DriveError::Actuator(e)) => {
                    tracing::error!("drive command failed: {:?}", e)
                }
            }
        }
    }

    /// Stored drive intensity (`0..=drive_range`).
    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == DriveState::Active
    }

    pub fn left(&self) -> &ServoHandle {
        &self.left
    }

    pub fn right(&self) -> &ServoHandle {
        &self.right
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    fn ensure_active(&self) -> Result<(), DriveError<H::Error>> {
        match self.state {
            DriveState::Active => Ok(()),
            DriveState::Stopped => {
                tracing::warn!("motion requested while drivetrain is stopped");
                Err(DriveError::NotInitialized)
            }
        }
    }

    fn step(
        &mut self,
        motion: Motion,
        steps: i32,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.ensure_active()?;
        let ms = self.config.clamp_duration(ms);
        let cmds = wheel_commands(motion, self.config.neutral, self.speed);
        for _ in 0..steps.max(0) {
            self.pulse(cmds, ms)?;
            self.pause(self.config.settle_ms);
        }
        Ok(())
    }

    fn turn(
        &mut self,
        motion: Motion,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.ensure_active()?;
        let ms = self.config.clamp_duration(ms);
        let cmds = wheel_commands(motion, self.config.neutral, self.config.turn_offset);
        self.pulse(cmds, ms)
    }

    /// Command both servos, hold for `ms`, return to neutral.
    fn pulse(
        &mut self,
        cmds: WheelCommands,
        ms: u32,
    ) -> Result<(), DriveError<H::Error>> {
        self.command(cmds)?;
        self.pause(ms);
        self.hold_neutral()
    }

    /// Right first, then left.
    fn command(
        &mut self,
        cmds: WheelCommands,
    ) -> Result<(), DriveError<H::Error>> {
        self.right
            .write(&mut self.hal, cmds.right)
            .map_err(DriveError::Actuator)?;
        self.left
            .write(&mut self.hal, cmds.left)
            .map_err(DriveError::Actuator)
    }

    fn hold_neutral(&mut self) -> Result<(), DriveError<H::Error>> {
        self.command(WheelCommands::neutral(self.config.neutral))
    }

    fn pause(
        &mut self,
        ms: u32,
    ) {
        tracing::debug!(ms, "hold");
        self.delay.delay_ms(ms);
    }

    fn any_attached(&self) -> bool {
        self.left.is_attached() || self.right.is_attached()
    }

    /// Detach both servos, returning the first failure.
    ///
    /// Motions are refused from here on even if a detach fails; the servo that
    /// failed stays attached so a later `stop` or drop retries it.
    fn release(&mut self) -> Result<(), DriveError<H::Error>> {
        self.state = DriveState::Stopped;
        let left = self.left.release(&mut self.hal);
        let right = self.right.release(&mut self.hal);
        left.and(right).map_err(DriveError::Actuator)
    }
}

impl<H, D> Drop for Drivetrain<H, D>
where
    H: ServoHal,
    D: DelayNs,
{
    fn drop(&mut self) {
        if self.any_attached() {
            if let Err(e) = self.release() {
                tracing::warn!("Failed to release servos on drop: {:?}", e);
            }
        }
    }
}
