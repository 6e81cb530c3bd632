//! legbook configuration.
//!
//! Loaded from `~/.legbook/config.toml`. Defaults apply when the file or a
//! key is missing:
//!
//! ```toml
//! database = "/var/lib/legbook/fleet.sqlite"
//! busy-timeout-ms = 5000
//! log-filter = "legbook=debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// legbook configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Database file. Defaults to `~/.legbook/legbook.sqlite`.
    pub database: Option<PathBuf>,

    /// How long a writer waits on a locked database.
    pub busy_timeout_ms: u64,

    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            busy_timeout_ms: 5_000,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from `~/.legbook/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.legbook/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".legbook").join("config.toml"))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database = \"/tmp/fleet.sqlite\"\nbusy-timeout-ms = 250\nlog-filter = \"legbook=debug\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.database, Some(PathBuf::from("/tmp/fleet.sqlite")));
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.log_filter, "legbook=debug");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "busy-timeout-ms = 100\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.database, None);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default-identity = \"x\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config"));
    }
}
