//! Optional `config.json` stored in the application directory. Every field has a default, so
//! the file only needs to mention the values that differ. Command line flags take precedence
//! over anything read from here.

use std::{
    io::ErrorKind,
    num::NonZeroU64,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_FLUSH_FREQUENCY: NonZeroU64 = match NonZeroU64::new(75) {
    Some(v) => v,
    None => panic!("flush frequency must be positive"),
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// A snapshot is written every time the total amount of key presses is divisible by this.
    pub flush_frequency: NonZeroU64,
    /// Where snapshots are written. Defaults to the user's desktop.
    pub output_dir: Option<PathBuf>,
    /// Maximum amount of key press handlers running at the same time.
    pub workers: usize,
    /// How often the keyboard backend is polled for held keys.
    pub poll_interval_ms: u64,
    /// Whether desktop notifications are shown at all.
    pub notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_frequency: DEFAULT_FLUSH_FREQUENCY,
            output_dir: None,
            workers: 4,
            poll_interval_ms: 10,
            notifications: true,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

/// Reads `config.json` from `app_dir`. A missing file is not an error.
pub fn load_config(app_dir: &Path) -> Result<Config> {
    let path = app_dir.join(CONFIG_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file {path:?}")),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration at {path:?}, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read configuration file {path:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, num::NonZeroU64, path::PathBuf};

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{load_config, Config, CONFIG_FILE_NAME};

    #[test]
    fn test_missing_config_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = load_config(dir.path())?;
        assert_eq!(config, Config::default());
        assert_eq!(config.flush_frequency.get(), 75);
        Ok(())
    }

    #[test]
    fn test_partial_config() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "flush-frequency": 10, "output-dir": "/tmp/keys" }"#,
        )?;

        let config = load_config(dir.path())?;
        assert_eq!(config.flush_frequency, NonZeroU64::new(10).unwrap());
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/keys")));
        assert_eq!(config.workers, Config::default().workers);
        assert!(config.notifications);
        Ok(())
    }

    #[test]
    fn test_zero_frequency_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "flush-frequency": 0 }"#)?;

        assert!(load_config(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_zero_workers_still_runs_one() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert_eq!(config.worker_count(), 1);
    }
}
