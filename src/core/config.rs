//! Configuration - Type-safe config loaded from `monitor.toml`.
//!
//! Every section is optional; missing keys fall back to defaults so an empty
//! file (or no file at all) yields a usable monitor.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub monitor: MonitorConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// What to do with CANCEL_ACK / CANCEL_REJECT when no cancel is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelPolicy {
    /// Treat as a duplicate delivery: no-op, no error
    #[default]
    Ignore,
    /// Surface `Error::NoOutstandingCancel`
    Reject,
}

/// Engine behaviour knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub unmatched_cancel: CancelPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Unix socket the `listen` driver binds
    pub socket_path: String,
    /// Bounded channel between socket readers and the dispatcher task
    pub channel_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/marking-monitor.sock".to_string(),
            channel_capacity: 4096,
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> crate::core::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::core::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> crate::core::Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| crate::core::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults.
    pub fn load_default() -> Self {
        let candidates = [
            "monitor.toml",
            concat!(env!("CARGO_MANIFEST_DIR"), "/monitor.toml"),
        ];

        for path in &candidates {
            match Self::load(Path::new(path)) {
                Ok(cfg) => {
                    tracing::info!("Loaded config from {}", path);
                    return cfg;
                }
                Err(e) if Path::new(path).exists() => {
                    tracing::warn!("Ignoring {}: {}", path, e);
                }
                Err(_) => {}
            }
        }

        tracing::debug!("No monitor.toml found, using defaults");
        Self::default()
    }

    fn validate(&self) -> crate::core::Result<()> {
        if self.ingest.channel_capacity == 0 {
            return Err(crate::core::Error::Config(
                "ingest.channel_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
