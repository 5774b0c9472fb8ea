//! # input_probe
//!
//! Inspect a device declaration and exercise a command backend.
//!
//! Loads a device config, computes its state layout and prints it. With
//! `--frequency`, also runs a set/query sampling frequency round trip
//! against a backend from the registry.
//!
//! # Usage
//!
//! ```bash
//! # Print the layout of a device
//! input_probe --config config/gamepad.toml
//!
//! # Layout as JSON, for diffing against recordings
//! input_probe -c config/gamepad.toml --output json
//!
//! # Sampling frequency round trip on the simulated backend
//! input_probe -c config/gamepad.toml --frequency 120 -v
//! ```

#![deny(warnings)]

use clap::{Parser, ValueEnum};
use input::config::{ConfigError, ConfigLoader, LogLevel};
use input::device::DeviceId;
use input_command::{
    BackendRegistry, CommandChannel, CommandResult, DeviceCommand, QuerySamplingFrequencyCommand,
    SetSamplingFrequencyCommand, SimulatedBackend, dispatch,
};
use input_state::{DeviceConfig, DeviceLayout, InputDevice};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Layout output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned table
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Input probe - device layout inspection and command round trips
#[derive(Parser, Debug)]
#[command(name = "input_probe")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Inspect input device state layouts and exercise command backends")]
#[command(long_about = None)]
struct Args {
    /// Path to the device configuration file
    #[arg(short, long, default_value = "config/gamepad.toml")]
    config: PathBuf,

    /// Runtime id assigned to the device
    #[arg(short = 'i', long, default_value_t = 1)]
    device_id: u32,

    /// Layout output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Run a sampling frequency round trip at this rate (Hz)
    #[arg(short, long)]
    frequency: Option<f32>,

    /// Backend to send commands to
    #[arg(short, long, default_value = SimulatedBackend::NAME)]
    backend: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = load_config(&args.config);
    let log_level = loaded
        .as_ref()
        .map(|config| config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    let result = match loaded {
        Ok(config) => run(&args, config),
        Err(e) => Err(format!("{}: {e}", args.config.display()).into()),
    };
    if let Err(e) = result {
        error!("input_probe failed: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<DeviceConfig, ConfigError> {
    let config = DeviceConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: DeviceConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} probing '{}'",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.device.name
    );

    let id = DeviceId(args.device_id);
    let device = InputDevice::build(id, &config.device)?;

    match args.output {
        OutputFormat::Text => print_layout(device.layout()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(device.layout())?),
    }

    if let Some(frequency) = args.frequency {
        let registry = BackendRegistry::with_builtin();
        debug!("Available backends: {:?}", registry.list_backends());
        let mut backend = registry.create_backend(&args.backend)?;
        probe_sampling_frequency(backend.as_mut(), id, frequency)?;
    }

    Ok(())
}

fn print_layout(layout: &DeviceLayout) {
    println!(
        "{} ({}): {} bytes of state, {} controls",
        layout.name(),
        layout.format(),
        layout.state_size_in_bytes(),
        layout.controls().len()
    );
    println!("{:<28} {:<6} {:>8} {:>5}", "PATH", "FORMAT", "OFFSET", "BITS");
    for control in layout.controls() {
        let block = &control.block;
        let offset = format!("{}.{}", block.byte_offset(), block.bit_offset());
        println!(
            "{:<28} {:<6} {:>8} {:>5}{}",
            control.path,
            block.format().to_string(),
            offset,
            block.size_in_bits(),
            if control.is_group { "  (group)" } else { "" }
        );
    }
}

/// Set the sampling frequency, then read it back. A backend without
/// sampling support is reported and skipped.
fn probe_sampling_frequency(
    channel: &mut dyn CommandChannel,
    device: DeviceId,
    frequency: f32,
) -> CommandResult<()> {
    let set = SetSamplingFrequencyCommand::create(frequency);
    debug!("Encoded {}: {:02x?}", set.header(), set.as_bytes());

    match dispatch(channel, device, &set) {
        Ok(reply) => info!(
            "'{}' accepted {} Hz for {}",
            channel.name(),
            reply.frequency(),
            device
        ),
        Err(e) if e.is_recoverable() => {
            warn!("{e}; skipping sampling frequency probe");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    let reply = dispatch(channel, device, &QuerySamplingFrequencyCommand::create())?;
    println!("{device}: sampling frequency {} Hz", reply.frequency());
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        log_level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
