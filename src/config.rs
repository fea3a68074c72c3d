//! Aggregator configuration.

use crate::error::{Result, SystemError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the snapshot aggregator and the host adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Upper bound for a single fact provider call in milliseconds
    pub provider_timeout_ms: u64,
    /// Recording margin before an event, in minutes
    pub margin_before_min: i64,
    /// Recording margin after an event, in minutes
    pub margin_after_min: i64,
    /// Whether the device can transcode streams
    pub transcoding: bool,
    /// Version string reported as `webifver`
    pub webif_version: String,
    /// Filesystem root the host adapters read `proc`, `sys` and `etc` from
    pub root: PathBuf,
    /// Autofs network maps, relative to `root`
    pub mount_tables: Vec<PathBuf>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: crate::DEFAULT_PROVIDER_TIMEOUT_MS,
            margin_before_min: 0,
            margin_after_min: 0,
            transcoding: false,
            webif_version: format!("boxinfo {}", env!("CARGO_PKG_VERSION")),
            root: PathBuf::from("/"),
            mount_tables: vec![
                PathBuf::from("etc/auto.network"),
                PathBuf::from("etc/auto.network_vti"),
            ],
        }
    }
}

impl AggregatorConfig {
    /// Create a configuration reading host facts below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load a JSON configuration file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SystemError::config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            SystemError::config_error(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the aggregator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.provider_timeout_ms == 0 {
            return Err(SystemError::config_error(
                "provider_timeout_ms must be > 0",
            ));
        }
        if self.margin_before_min < 0 || self.margin_after_min < 0 {
            return Err(SystemError::config_error(
                "recording margins must not be negative",
            ));
        }
        if self.mount_tables.iter().any(|p| p.is_absolute()) {
            return Err(SystemError::config_error(
                "mount_tables entries are relative to root",
            ));
        }
        Ok(())
    }

    /// Set the per-provider timeout.
    pub fn with_provider_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.provider_timeout_ms = timeout_ms;
        self
    }

    /// Set the recording margins in minutes.
    pub fn with_margins(mut self, before_min: i64, after_min: i64) -> Self {
        self.margin_before_min = before_min;
        self.margin_after_min = after_min;
        self
    }

    /// Enable or disable the transcoding capability flag.
    pub fn with_transcoding(mut self, transcoding: bool) -> Self {
        self.transcoding = transcoding;
        self
    }

    /// Set the reported web interface version.
    pub fn with_webif_version(mut self, version: impl Into<String>) -> Self {
        self.webif_version = version.into();
        self
    }

    /// Set the filesystem root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Replace the list of autofs maps.
    pub fn with_mount_tables(mut self, tables: Vec<PathBuf>) -> Self {
        self.mount_tables = tables;
        self
    }

    /// The per-provider timeout as a `Duration`.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Resolve a root-relative path such as `proc/meminfo`.
    pub fn host_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
