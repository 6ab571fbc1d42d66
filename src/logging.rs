//! Logging setup for rankgate.
//!
//! `[logging] level` is an `EnvFilter` directive string, so it accepts either
//! a bare level (`"debug"`) or per-target directives
//! (`"rankgate=debug,sqlx=warn"`). `RUST_LOG`, when set, wins over it.
//! Everything is written to stderr so command output on stdout stays clean.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

const FALLBACK_DIRECTIVE: &str = "info";

/// Parse a configured directive string, falling back to `info` when it does
/// not parse.
pub fn filter_from_directives(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

fn resolve_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_from_directives(directives))
}

/// Initialize logging to stderr and an appending log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = File::options()
        .create(true)
        .append(true)
        .open(&config.file)?;
    let writer = std::io::stderr.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(resolve_filter(&config.level))
        .init();

    Ok(())
}

/// Initialize stderr-only logging. Used when the log file cannot be opened.
pub fn init_console_only(directives: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(resolve_filter(directives))
        .init();
}
