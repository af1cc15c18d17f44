use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use wakeguard_core::actuation::domain::actuator_sink::ActuatorSink;
use wakeguard_core::actuation::infrastructure::log_actuator_sink::LogActuatorSink;
use wakeguard_core::actuation::infrastructure::sysfs_gpio_sink::SysfsGpioSink;
use wakeguard_core::alerting::domain::monitor_event::MonitorEvent;
use wakeguard_core::detection::domain::face_selection::FaceSelection;
use wakeguard_core::detection::infrastructure::cached_landmark_provider::CachedLandmarkProvider;
use wakeguard_core::detection::infrastructure::landmark_trace::LandmarkTrace;
use wakeguard_core::pipeline::fatigue_monitor_use_case::{
    FatigueMonitorUseCase, MonitorError, RunOutcome,
};
use wakeguard_core::pipeline::monitor_logger::{LogMonitorLogger, MonitorLogger};
use wakeguard_core::shared::clock::{ManualClock, Timestamp};
use wakeguard_core::shared::config::{ActuatorBackend, ActuatorConfig, MonitorConfig};
use wakeguard_core::shared::constants::DEFAULT_REPLAY_FPS;
use wakeguard_core::video::domain::frame_source::FrameSourceError;
use wakeguard_core::video::infrastructure::replay_frame_source::ReplayFrameSource;

/// Driver fatigue monitor with buzzer and relay escalation.
///
/// Replays a recorded facial landmark trace (JSON Lines) through the
/// fatigue state machine.
#[derive(Parser, Debug)]
#[command(name = "wakeguard")]
struct Cli {
    /// Landmark trace to replay.
    trace: PathBuf,

    /// Config file (default: platform config dir, WakeGuard/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame rate used for trace records without a timestamp.
    #[arg(long, default_value_t = DEFAULT_REPLAY_FPS)]
    fps: f64,

    /// Which face drives the monitor: first or largest.
    #[arg(long)]
    face_selection: Option<FaceSelection>,

    /// Drive the buzzer and relay through sysfs GPIO instead of logging.
    #[arg(long)]
    gpio: bool,

    /// sysfs GPIO root directory.
    #[arg(long)]
    gpio_root: Option<PathBuf>,

    /// Append log output to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = MonitorConfig::load(cli.config.as_deref())?;
    apply_overrides(&cli, &mut config);
    config.validate()?;
    init_logging(config.log_file.as_deref())?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut logger = LogMonitorLogger::new();
    let trace = load_trace(&cli.trace, &mut logger)?;
    log::info!(
        "Replaying {} frames from {} (actuators: {}, face selection: {})",
        trace.len(),
        cli.trace.display(),
        config.actuators.backend,
        config.face_selection
    );

    let clock = ManualClock::new();
    let source = ReplayFrameSource::new(&trace, cli.fps, clock.clone());
    let provider = CachedLandmarkProvider::new(Arc::new(trace.faces_by_frame()));
    let sink = build_sink(&config.actuators)?;

    let mut monitor = FatigueMonitorUseCase::new(
        Box::new(source),
        Box::new(provider),
        sink,
        Box::new(clock),
        Box::new(logger),
        config.thresholds,
        config.face_selection,
        Some(cancelled),
    );
    match monitor.run()? {
        RunOutcome::EndOfStream => log::info!("End of stream after {} frames", monitor.frames()),
        RunOutcome::Interrupted => log::info!("Interrupted after {} frames", monitor.frames()),
    }
    Ok(())
}

/// Opens the trace as the camera; any failure is reported as `camera_error`.
fn load_trace(
    path: &Path,
    logger: &mut dyn MonitorLogger,
) -> Result<LandmarkTrace, MonitorError> {
    LandmarkTrace::load(path).map_err(|e| {
        let e = FrameSourceError::from(e);
        logger.event(&MonitorEvent::CameraError {
            at: Timestamp::ZERO,
            message: e.to_string(),
        });
        MonitorError::from(e)
    })
}

fn apply_overrides(cli: &Cli, config: &mut MonitorConfig) {
    if let Some(selection) = cli.face_selection {
        config.face_selection = selection;
    }
    if cli.gpio {
        config.actuators.backend = ActuatorBackend::Gpio;
    }
    if let Some(root) = &cli.gpio_root {
        config.actuators.gpio_root = root.clone();
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn build_sink(config: &ActuatorConfig) -> Result<Box<dyn ActuatorSink>, Box<dyn std::error::Error>> {
    match config.backend {
        ActuatorBackend::Log => Ok(Box::new(LogActuatorSink::new())),
        ActuatorBackend::Gpio => Ok(Box::new(SysfsGpioSink::open(
            &config.gpio_root,
            config.primary_pin,
            config.secondary_pin,
        )?)),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.fps.is_finite() || cli.fps <= 0.0 {
        return Err(format!("FPS must be a positive number, got {}", cli.fps).into());
    }
    Ok(())
}
