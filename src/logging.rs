//! Tracing setup.
//!
//! Log output goes to stderr for the batch commands. The TUI owns the terminal
//! (raw mode + alternate screen), so there we write to a log file instead.
//!
//! Filtering honours `RUST_LOG`; without it the default level is `info`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default log file used by the TUI when `MUON_LOG` is not set.
pub const DEFAULT_LOG_FILE: &str = "muon.log";

/// Where log events are written.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Log file target for the TUI, taken from `MUON_LOG` when present.
    pub fn tui_default() -> Self {
        dotenvy::dotenv().ok();
        let path = std::env::var("MUON_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        LogTarget::File(PathBuf::from(path))
    }
}

/// Install the global subscriber.
///
/// Calling this twice is harmless: the second call keeps the first subscriber.
pub fn init(target: &LogTarget, verbose: bool) -> Result<(), AppError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    if let Err(e) = result {
        // Already initialised (tests, repeated runs in one process).
        tracing::debug!("tracing subscriber not installed: {e}");
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::io(format!("Failed to create log file '{}': {e}", path.display())))
}
