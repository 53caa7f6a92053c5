//! Run diagnostics via `tracing` and `tracing-subscriber`.
//!
//! Diagnostics go to the log file named on the command line, never to the
//! output file. `RUST_LOG` overrides the level derived from `-v`.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter, used when `RUST_LOG` is unset.
    pub level: Level,
    /// File that receives the log lines.
    pub log_file: PathBuf,
    /// Append to an existing log instead of truncating it.
    pub append: bool,
}

impl LogConfig {
    /// - 0 (no `-v`): info level
    /// - 1 (`-v`): debug level
    /// - 2+ (`-vv`): trace level
    pub fn from_verbosity(log_file: impl AsRef<Path>, verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            log_file: log_file.as_ref().to_path_buf(),
            append: true,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()))
    }
}

/// Install the global subscriber writing to the configured log file.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity("run.log", 0).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity("run.log", 1).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity("run.log", 5).level, Level::TRACE);
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let config = LogConfig::from_verbosity(&path, 0);

        // Another test may already own the global subscriber
        let _ = init_logging(&config);
        assert!(path.exists());
    }
}
