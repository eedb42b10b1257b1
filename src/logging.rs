use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, WriteLogger};

/// Path of the log file for a run started now: `<log_dir>/<tool>_<timestamp>.log`.
pub fn log_file_path(log_dir: &Path, tool: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    log_dir.join(format!("{tool}_{timestamp}.log"))
}

/// Sends `log` output to a fresh file under `log_dir` and returns its path.
pub fn init(log_dir: &Path, tool: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Cannot create log directory {}", log_dir.display()))?;

    let log_path = log_file_path(log_dir, tool);
    let file = fs::File::create(&log_path)
        .with_context(|| format!("Cannot open log file {}", log_path.display()))?;

    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Info,
        ConfigBuilder::new().build(),
        file,
    )])
    .context("Failed to initialise logger")?;

    Ok(log_path)
}
