// src/logging.rs
//! tracing setup. Logs go to a file because the terminal screen owns stdout.

use crate::config::AppConfig;
use crate::error::{LocationError, Result};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "location-display.log";

/// Install the global subscriber writing into `dir`. `RUST_LOG` wins over
/// the configured level.
pub fn init(config: &AppConfig, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| LocationError::Other(format!("Failed to initialise logging: {}", e)))?;

    Ok(path)
}
