//! Tracing subscriber for the barlight binary
//!
//! Console output goes to stderr so stdout stays free for the final stats
//! JSON. File output is optional and written by a background worker.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use barlight_core::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer flushing until dropped at exit
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Level from the log settings unless `RUST_LOG` overrides it
fn rig_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Install the global subscriber
///
/// `rig` is the configuration file being driven; it is recorded in the
/// first log line so a log file can be matched to its rig.
pub fn init(config: &LogConfig, rig: &Path) -> Result<Option<LogGuard>> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;

    if config.file_output {
        match config.cleanup_old_logs() {
            Ok(0) => {}
            Ok(removed) => eprintln!("Removed {} old barlight log files", removed),
            Err(e) => eprintln!("Warning: Failed to clean up old log files: {}", e),
        }
    }

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(rig_filter(config))
    });

    let (file_layer, guard) = if config.file_output {
        let log_path = config.current_log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {:?}", log_path))?;
        let (writer, worker) = tracing_appender::non_blocking(file);

        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(rig_filter(config));
        (Some(layer), Some(LogGuard { _worker: worker }))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        "barlight {} driving rig {:?} (log level {})",
        env!("CARGO_PKG_VERSION"),
        rig,
        config.level
    );
    if config.file_output {
        tracing::info!("Logging to {:?}", config.current_log_path());
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::Registry;

    #[test]
    fn test_filter_follows_configured_level() {
        // RUST_LOG takes precedence, nothing to check when it is set
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        for (level, expected) in [
            ("debug", LevelFilter::DEBUG),
            ("warn", LevelFilter::WARN),
            ("bogus", LevelFilter::INFO),
        ] {
            let config = LogConfig {
                level: level.to_string(),
                ..LogConfig::default()
            };
            let filter = rig_filter(&config);
            assert_eq!(
                <EnvFilter as Layer<Registry>>::max_level_hint(&filter),
                Some(expected),
                "level {}",
                level
            );
        }
    }
}
