use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_time::Timer;
use embedded_hal::delay::DelayNs;
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twb_core::mk_static;
use twb_core::utils::controllers::ServoHal;
use twb_core::utils::{DRIVE_CHANNEL, Delay, DriveCommand, DriveConfig, Drivetrain};

/// Commands run when no script is given.
const DEMO_SCRIPT: &str = r#"
{"dc":"speed","v":50}
{"dc":"forward","steps":2,"ms":300}
{"dc":"right","ms":400}
{"dc":"backward","steps":1,"ms":300}
{"dc":"left","ms":400}
{"dc":"stop"}
"#;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// Pin of the left wheel servo
    #[clap(long, default_value_t = 3)]
    left_pin: u8,
    /// Pin of the right wheel servo
    #[clap(long, default_value_t = 4)]
    right_pin: u8,
    /// JSON file with drive tuning (missing fields keep their defaults)
    #[clap(long)]
    config: Option<PathBuf>,
    /// File with one JSON drive command per line
    #[clap(long)]
    script: Option<PathBuf>,
    /// Skip real pauses
    #[clap(long)]
    fast: bool,
}

/// Servo backend that logs to console.
struct ConsoleServos;

impl ServoHal for ConsoleServos {
    type Error = Infallible;

    fn attach(&mut self, pin: u8) -> Result<(), Self::Error> {
        info!("servo {pin}: attach");
        Ok(())
    }

    fn write(&mut self, pin: u8, angle: u8) -> Result<(), Self::Error> {
        info!("servo {pin}: {angle} deg");
        Ok(())
    }

    fn detach(&mut self, pin: u8) -> Result<(), Self::Error> {
        info!("servo {pin}: detach");
        Ok(())
    }
}

/// Blocking pause on the host clock, or none at all with `--fast`.
struct HostDelay {
    fast: bool,
}

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        if !self.fast {
            Delay.delay_ns(ns);
        }
    }
}

type HostDrivetrain = Drivetrain<ConsoleServos, HostDelay>;

#[embassy_executor::task]
async fn drive_task(drivetrain: &'static mut HostDrivetrain) -> ! {
    drivetrain.drive_ch().await
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner, opts: Opts) {
    let config = match &opts.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DriveConfig::default(),
    };
    info!(?config, "drive config");

    let script = match &opts.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to read script {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DEMO_SCRIPT.to_owned(),
    };

    let drivetrain = match Drivetrain::new(
        ConsoleServos,
        HostDelay { fast: opts.fast },
        opts.left_pin,
        opts.right_pin,
        config,
    ) {
        Ok(dt) => dt,
        Err(e) => {
            error!("failed to initialize drivetrain: {:?}", e);
            std::process::exit(1);
        }
    };
    let drivetrain = mk_static!(HostDrivetrain, drivetrain);
    spawner.spawn(drive_task(drivetrain)).unwrap();

    let mut invalid = 0usize;
    for (n, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match DriveCommand::parse(line.as_bytes()) {
            Ok(cmd) => DRIVE_CHANNEL.send(cmd).await,
            Err(e) => {
                warn!("line {}: invalid command {:?}: {}", n + 1, line, e);
                invalid += 1;
            }
        }
    }
    info!("script queued");

    // drive_task executes a command in the same poll that receives it, so an
    // empty channel means the last command has finished.
    while !DRIVE_CHANNEL.is_empty() {
        Timer::after_millis(1).await;
    }
    if invalid > 0 {
        error!("script finished with {} invalid line(s)", invalid);
        std::process::exit(2);
    }
    info!("script finished");
    std::process::exit(0);
}

fn load_config(path: &PathBuf) -> Result<DriveConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let opts: Opts = Opts::parse();
    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, opts)).unwrap();
    });
}
