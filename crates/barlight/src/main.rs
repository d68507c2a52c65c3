//! Barlight - Spectrum-Driven Art-Net Lighting
//!
//! Reads per-band loudness frames and renders them onto RGB fixtures via
//! Art-Net.

#![warn(missing_docs)]

mod logging_setup;
mod source;

use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use barlight_control::{ControlError, Engine, EngineOptions};
use barlight_core::{Config, LogConfig};
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};

use crate::source::{AsciiFrameReader, DemoSource, FrameSource};

/// Where frames come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Input {
    /// ASCII frames on stdin, `;`-separated, one per line
    Stdin,
    /// Built-in synthetic spectrum
    Demo,
}

/// Drive Art-Net RGB fixtures from audio spectrum bars
#[derive(Debug, Parser)]
#[command(name = "barlight", version, about)]
struct Cli {
    /// Rig configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Frame input
    #[arg(short, long, value_enum, default_value_t = Input::Stdin)]
    input: Input,

    /// Frame rate of the demo input
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Render without opening sockets
    #[arg(long)]
    offline: bool,

    /// Print the group/device mapping and exit
    #[arg(long)]
    describe: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also log to a file
    #[arg(long)]
    log_file: bool,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level.clone(),
        file_output: cli.log_file,
        log_dir: cli.log_dir.clone(),
        ..LogConfig::default()
    };
    let _log_guard = logging_setup::init(&log_config, &cli.config)?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    let topology = config.topology()?;
    let bars = topology.bars_count;

    let mut engine = Engine::with_options(
        topology,
        EngineOptions {
            connect: !cli.offline && !cli.describe,
        },
    );

    for group in engine.describe_mapping() {
        info!(
            "Color mapping {}: {} devices {:?}, entries {:?}",
            group.group,
            group.devices.len(),
            group.devices,
            group
                .entries
                .iter()
                .map(|e| (e.band, e.hue))
                .collect::<Vec<_>>()
        );
    }
    if cli.describe {
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let mut source: Box<dyn FrameSource> = match cli.input {
        Input::Stdin => Box::new(AsciiFrameReader::new(BufReader::new(std::io::stdin()))),
        Input::Demo => Box::new(DemoSource::new(bars, cli.fps)),
    };

    info!("Rendering {} bands from {:?}", bars, cli.input);
    let mut rendered = 0u64;
    while running.load(Ordering::SeqCst) {
        if cli.frames.is_some_and(|limit| rendered >= limit) {
            break;
        }
        let Some(frame) = source.next_frame()? else {
            info!("Input exhausted");
            break;
        };

        match engine.update_colors(&frame) {
            Ok(report) => {
                if report.floor_applied {
                    debug!("Frame {} rendered at darkness floor", rendered);
                }
            }
            Err(ControlError::InvalidFrame { expected, actual }) => {
                warn!(
                    "Dropping frame with {} bands, configuration expects {}",
                    actual, expected
                );
            }
            Err(e) => return Err(e.into()),
        }
        rendered += 1;
    }

    let stats = engine.shutdown();
    info!(
        "Done: {} frames, {} packets, {} clipped values, {} send failures",
        stats.frames_sent, stats.packets_sent, stats.value_exceed_count, stats.send_failures
    );
    println!("{}", serde_json::to_string(&stats)?);

    Ok(())
}
