//! Configuration management (native only).

use std::time::Duration;

use anyhow::{bail, Context};
use faderdeck_types::mixer::{DEFAULT_HEARTBEAT_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_STALE_AFTER};
use faderdeck_types::{DEFAULT_DEVICE, DEFAULT_ENGINE_URL, MAX_DEVICE};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::console::ConsoleSettings;
use crate::sequencing::OrderingPolicy;

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    heartbeat: HeartbeatConfig,
    #[serde(default)]
    sync: SyncConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineConfig {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default = "default_device")]
    device: u8,
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            device: default_device(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HeartbeatConfig {
    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
    #[serde(default = "default_stale_after")]
    stale_after: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            stale_after: default_stale_after(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SyncConfig {
    #[serde(default)]
    ordering: OrderingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_device() -> u8 {
    DEFAULT_DEVICE
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_MS
}

fn default_stale_after() -> u32 {
    DEFAULT_STALE_AFTER
}

/// Values given on the command line. They take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub engine_url: Option<String>,
    pub device: Option<u8>,
    pub heartbeat_ms: Option<u64>,
    pub stale_after: Option<u32>,
    pub ordering: Option<OrderingPolicy>,
    pub log_level: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the engine's control API
    pub engine_url: String,
    /// Device id, first path segment of every request
    pub device: u8,
    pub request_timeout: Duration,
    /// Time between state polls
    pub heartbeat_interval: Duration,
    /// Consecutive failed polls before the link is shown as disconnected
    pub stale_after: u32,
    pub ordering: OrderingPolicy,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `config.toml` in user config directory (~/.config/faderdeck/ on Linux)
    /// 2. `.faderdeck.toml` in current directory
    ///
    /// Environment variables use the `FADERDECK_` prefix and `__` between
    /// section and key, e.g. `FADERDECK_HEARTBEAT__INTERVAL_MS=500`.
    pub fn from_figment(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".faderdeck.toml"));
        let user_config = directories::ProjectDirs::from("", "", "faderdeck")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        // 1. Start with defaults
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        // 2. Merge user config file if it exists
        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // 3. Merge local config file if it exists
        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // 4. Merge environment variables (FADERDECK_* prefix)
        figment = figment.merge(Env::prefixed("FADERDECK_").split("__"));

        // 5. Merge CLI arguments (highest priority)
        if let Some(ref url) = overrides.engine_url {
            figment = figment.merge(Serialized::default("engine.url", url));
        }
        if let Some(device) = overrides.device {
            figment = figment.merge(Serialized::default("engine.device", device));
        }
        if let Some(ms) = overrides.heartbeat_ms {
            figment = figment.merge(Serialized::default("heartbeat.interval_ms", ms));
        }
        if let Some(n) = overrides.stale_after {
            figment = figment.merge(Serialized::default("heartbeat.stale_after", n));
        }
        if let Some(ordering) = overrides.ordering {
            figment = figment.merge(Serialized::default("sync.ordering", ordering));
        }
        if let Some(ref level) = overrides.log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        let config_file: ConfigFile = figment.extract().context("Invalid configuration")?;
        Self::from_file(config_file)
    }

    fn from_file(file: ConfigFile) -> anyhow::Result<Self> {
        let url = file.engine.url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("engine url must start with http:// or https://, got {:?}", url);
        }
        if file.engine.device > MAX_DEVICE {
            bail!(
                "device id {} out of range (0..={})",
                file.engine.device,
                MAX_DEVICE
            );
        }
        if file.heartbeat.interval_ms == 0 {
            bail!("heartbeat interval must be greater than zero");
        }
        if file.engine.request_timeout_ms == 0 {
            bail!("request timeout must be greater than zero");
        }

        Ok(Self {
            engine_url: url,
            device: file.engine.device,
            request_timeout: Duration::from_millis(file.engine.request_timeout_ms),
            heartbeat_interval: Duration::from_millis(file.heartbeat.interval_ms),
            stale_after: file.heartbeat.stale_after.max(1),
            ordering: file.sync.ordering,
            log_level: file.logging.log_level,
        })
    }

    /// Console runtime settings derived from this configuration.
    pub fn settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            heartbeat_interval: self.heartbeat_interval,
            stale_after: self.stale_after,
            ordering: self.ordering,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_url: default_url(),
            device: DEFAULT_DEVICE,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_MS),
            stale_after: DEFAULT_STALE_AFTER,
            ordering: OrderingPolicy::default(),
            log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 4] = [
        "FADERDECK_ENGINE__URL",
        "FADERDECK_ENGINE__DEVICE",
        "FADERDECK_HEARTBEAT__INTERVAL_MS",
        "FADERDECK_SYNC__ORDERING",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    /// Run `f` with the current directory set to a fresh temp dir holding
    /// `.faderdeck.toml` (if given).
    fn in_temp_dir<T>(config: Option<&str>, f: impl FnOnce() -> T) -> T {
        let temp_dir = TempDir::new().unwrap();
        if let Some(content) = config {
            fs::write(temp_dir.path().join(".faderdeck.toml"), content).unwrap();
        }

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();
        let result = f();

        // Restore (ignore errors)
        let _ = std::env::set_current_dir(original_dir);
        result
    }

    #[test]
    #[serial]
    fn test_from_figment_defaults() {
        clear_env();
        let config = in_temp_dir(None, || Config::from_figment(ConfigOverrides::default())).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.engine_url, DEFAULT_ENGINE_URL);
        assert_eq!(config.heartbeat_interval, Duration::from_millis(1000));
        assert_eq!(config.ordering, OrderingPolicy::LastApplied);
    }

    #[test]
    #[serial]
    fn test_from_figment_config_file() {
        clear_env();
        let content = r#"
[engine]
url = "http://mixer.local:1776"
device = 2

[heartbeat]
interval_ms = 250
stale_after = 5

[sync]
ordering = "sequenced"
"#;
        let config =
            in_temp_dir(Some(content), || Config::from_figment(ConfigOverrides::default()))
                .unwrap();

        assert_eq!(config.engine_url, "http://mixer.local:1776");
        assert_eq!(config.device, 2);
        assert_eq!(config.heartbeat_interval, Duration::from_millis(250));
        assert_eq!(config.stale_after, 5);
        assert_eq!(config.ordering, OrderingPolicy::Sequenced);
    }

    #[test]
    #[serial]
    fn test_env_vars_override_config_file() {
        clear_env();
        std::env::set_var("FADERDECK_HEARTBEAT__INTERVAL_MS", "400");

        let config = in_temp_dir(Some("[heartbeat]\ninterval_ms = 250"), || {
            Config::from_figment(ConfigOverrides::default())
        });
        clear_env();

        assert_eq!(
            config.unwrap().heartbeat_interval,
            Duration::from_millis(400)
        );
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env_and_config() {
        clear_env();
        std::env::set_var("FADERDECK_ENGINE__URL", "http://from-env:1");

        let overrides = ConfigOverrides {
            engine_url: Some("http://from-cli:2".to_string()),
            heartbeat_ms: Some(100),
            ordering: Some(OrderingPolicy::Sequenced),
            ..Default::default()
        };
        let config = in_temp_dir(Some("[engine]\nurl = \"http://from-file:3\""), || {
            Config::from_figment(overrides)
        });
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.engine_url, "http://from-cli:2");
        assert_eq!(config.heartbeat_interval, Duration::from_millis(100));
        assert_eq!(config.ordering, OrderingPolicy::Sequenced);
    }

    #[test]
    #[serial]
    fn test_rejects_zero_heartbeat() {
        clear_env();
        let overrides = ConfigOverrides {
            heartbeat_ms: Some(0),
            ..Default::default()
        };
        let result = in_temp_dir(None, || Config::from_figment(overrides));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_rejects_device_out_of_range() {
        clear_env();
        let overrides = ConfigOverrides {
            device: Some(8),
            ..Default::default()
        };
        let result = in_temp_dir(None, || Config::from_figment(overrides));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_rejects_non_http_url() {
        clear_env();
        let result = in_temp_dir(Some("[engine]\nurl = \"mixer.local\""), || {
            Config::from_figment(ConfigOverrides::default())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_settings() {
        let config = Config {
            stale_after: 7,
            ordering: OrderingPolicy::Sequenced,
            ..Default::default()
        };
        let settings = config.settings();
        assert_eq!(settings.stale_after, 7);
        assert_eq!(settings.ordering, OrderingPolicy::Sequenced);
        assert_eq!(settings.heartbeat_interval, config.heartbeat_interval);
    }
}
