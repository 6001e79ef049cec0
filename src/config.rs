use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user data directory under $HOME
const DATA_DIR_NAME: &str = ".clipboard_history";
const HISTORY_FILE: &str = "history.json";
const CONFIG_FILE: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Largest capture kept, in megabytes
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
    /// Entries older than this are dropped when monitoring starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    /// Seconds between clipboard reads
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
}

// Default value helpers
fn default_max_size_mb() -> u64 {
    10
}
fn default_poll_interval() -> f64 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            retention_days: None,
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Config {
    /// Load the configuration from `dir`, writing the defaults on first run
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::config_path(dir);
        if !path.exists() {
            let config = Self::default();
            config.save(dir)?;
            log::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.poll_interval()
            .context("Invalid poll_interval_seconds")
            .map(|_| ())
    }

    /// Save configuration into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::config_path(dir), content)?;
        Ok(())
    }

    /// Maximum entry size in bytes
    pub fn max_size_bytes(&self) -> usize {
        usize::try_from(self.max_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        interval_from_secs(self.poll_interval_seconds)
    }

    /// Get the path to the config file
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Get the path to the history file
    pub fn history_path(dir: &Path) -> PathBuf {
        dir.join(HISTORY_FILE)
    }

    /// Default per-user data directory
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(DATA_DIR_NAME))
    }
}

/// Convert a user-supplied number of seconds into a poll interval
pub fn interval_from_secs(secs: f64) -> Result<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        bail!("interval must be a positive number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow::anyhow!("interval of {secs} seconds is out of range: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::config_path(dir.path()).exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::config_path(dir.path()), "retention_days = 30\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.retention_days, Some(30));
        assert_eq!(config.max_size_mb, 10);
        assert_eq!(config.poll_interval().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            max_size_mb: 2,
            retention_days: Some(7),
            poll_interval_seconds: 0.5,
        };
        config.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_max_size_bytes() {
        let config = Config {
            max_size_mb: 3,
            ..Config::default()
        };
        assert_eq!(config.max_size_bytes(), 3 * 1024 * 1024);
    }

    #[test]
    fn test_rejects_bad_interval() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::config_path(dir.path()), "poll_interval_seconds = 0.0\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_interval() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::config_path(dir.path()), "poll_interval_seconds = 1e30\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_interval_from_secs() {
        assert_eq!(interval_from_secs(0.25).unwrap(), Duration::from_millis(250));
        assert!(interval_from_secs(1e20).is_err());
        assert!(interval_from_secs(-1.0).is_err());
        assert!(interval_from_secs(f64::NAN).is_err());
        assert!(interval_from_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::config_path(dir.path()), "max_size_mb = \"lots\"\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
