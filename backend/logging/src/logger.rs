//! Structured logger.
//!
//! Wraps `tracing` with environment-based level control, a console layer,
//! and an optional daily-rolling NDJSON file layer for operators.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration supplied by the host binary.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Fallback level filter when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"chatforge_commands=debug"`.
    pub level: String,
    /// Directory for the rolling NDJSON file; `None` logs to console only.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), dir: None }
    }
}

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let file_layer = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "chatforge.log");
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}
