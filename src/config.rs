use std::fs;
use std::io::ErrorKind;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Default listen address: all interfaces, port 8080.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default outbound fetch timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Client-identifying header value sent to every device.
pub const DEFAULT_USER_AGENT: &str = "prometheus-exporter";

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Top-level configuration loaded from `config.json`.
//
// Every field has a default, so an absent file or an empty
// object yields a working exporter listening on :8080.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to
    pub listen: String,

    /// Outbound device fetch settings
    pub device: DeviceConfig,

    /// Targets allowed for `/probe`
    ///
    /// NOTE:
    /// An empty list accepts any target. The `target` query
    /// parameter is otherwise forwarded unvalidated.
    pub allowed_targets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            device: DeviceConfig::default(),
            allowed_targets: Vec::new(),
        }
    }
}

impl Config {
    /// Returns true if `target` may be probed under this configuration.
    pub fn target_allowed(&self, target: &str) -> bool {
        self.allowed_targets.is_empty() || self.allowed_targets.iter().any(|t| t == target)
    }
}

// ------------------------------------------------------------
// Device configuration
// ------------------------------------------------------------
//
// Controls how a single scrape talks to the power meter.
//
// There are no retry settings: every scrape performs exactly
// one request bounded by `timeout_ms`.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceConfig {
    /// Total request timeout in milliseconds
    pub timeout_ms: u64,

    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ------------------------------------------------------------
// Configuration loader
// ------------------------------------------------------------
//
// Reads a JSON configuration file from disk and deserializes
// it into `Config`.
//
// A missing file is not an error: defaults apply. A file that
// exists but does not parse is rejected.
//
pub fn load_config(path: &str) -> anyhow::Result<Config> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config file at {path}, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {path}")),
    };

    let cfg = serde_json::from_str(&data).with_context(|| format!("failed to parse {path}"))?;
    Ok(cfg)
}
