//! Shared environment configuration for the EduPulse binaries.
//!
//! Consolidates the `EDUPULSE_BASE_PATH`, `EDUPULSE_PORT`, and
//! `EDUPULSE_DATA_DIR` reads so every binary resolves them the same way.

use std::path::PathBuf;

use tracing::{error, info};

/// Read `EDUPULSE_BASE_PATH` (default `"."`) and chdir into it so relative
/// data paths resolve. Exits on failure.
pub fn init_base_path() -> PathBuf {
    let base_path = std::env::var("EDUPULSE_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(&base_path);
    if std::env::set_current_dir(&base_path).is_err() {
        error!(base_path = %base_path, "failed to change directory");
        std::process::exit(1);
    }
    if let Ok(cwd) = std::env::current_dir() {
        info!(dir = %cwd.display(), "working directory");
    }
    path
}

/// Read `EDUPULSE_PORT` (default 8000).
pub fn server_port() -> u16 {
    std::env::var("EDUPULSE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000)
}

/// Read `EDUPULSE_DATA_DIR` (default `"data"`).
pub fn data_dir() -> PathBuf {
    std::env::var("EDUPULSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}
