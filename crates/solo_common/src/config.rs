//! Solo configuration
//!
//! Optional TOML file at `$XDG_CONFIG_HOME/solo/config.toml`. Absent or
//! unparseable config falls back to defaults; the framework never fails to
//! start over configuration.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

fn default_port() -> u16 {
    7878
}

fn default_probe_timeout_ms() -> u64 {
    500
}

fn default_call_timeout_ms() -> u64 {
    5_000
}

fn default_max_port_attempts() -> u16 {
    20
}

fn default_grace_secs() -> u64 {
    5
}

/// Port and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Port used when `--serve` is given without `--port`.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Bound on the liveness probe (short: probes must fail fast).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Bound on forwarded method calls (longer: operations do real work).
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// How far the upward port scan goes before giving up.
    #[serde(default = "default_max_port_attempts")]
    pub max_port_attempts: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            default_port: default_port(),
            probe_timeout_ms: default_probe_timeout_ms(),
            call_timeout_ms: default_call_timeout_ms(),
            max_port_attempts: default_max_port_attempts(),
        }
    }
}

/// Daemon shutdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Grace window for in-flight requests after a termination signal.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            grace_secs: default_grace_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl Config {
    pub fn load() -> Self {
        let path = paths::config_path();
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
                tracing::warn!("ignoring unparseable config at {}", path.display());
            }
        }
        Self::default()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.network.probe_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.network.call_timeout_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.daemon.grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.network.default_port, 7878);
        assert!(config.probe_timeout() < config.call_timeout());
        assert!(config.network.max_port_attempts > 0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str("[network]\ndefault_port = 4000\n").unwrap();
        assert_eq!(config.network.default_port, 4000);
        assert_eq!(config.network.max_port_attempts, 20);
        assert_eq!(config.daemon.grace_secs, 5);
    }
}
