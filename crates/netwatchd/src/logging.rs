//! Tracing setup.
//!
//! The watchdog writes timestamped, level-tagged lines to an append-only
//! log file. `RUST_LOG` overrides the configured level.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use netwatch_core::config::LoggingConfig;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn filter(default_level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_level)?),
    }
}

/// Log to the configured file, or to stderr if it is empty or unusable.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(&config.level)?)
        .with_target(false);

    match config.file().map(|path| (path, open_log_file(Path::new(path)))) {
        Some((_, Ok(file))) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Some((path, Err(e))) => {
            builder.with_writer(std::io::stderr).init();
            warn!(%path, error = %e, "cannot open log file, logging to stderr");
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Log to stderr only, for one-shot commands.
pub fn init_stderr(default_level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level)?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
