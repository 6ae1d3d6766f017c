//! netwatch.toml configuration parser.
//!
//! Every field has a default, so an absent file or an empty one yields the
//! stock watchdog: probe `8.8.8.8:53` every 10s, cycle `Wi-Fi` after two
//! consecutive failures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_SETTLE_AFTER_DISABLE: Duration = Duration::from_secs(5);
const DEFAULT_SETTLE_AFTER_ENABLE: Duration = Duration::from_secs(10);

/// Placeholder substituted with the interface name in recovery commands.
pub const INTERFACE_PLACEHOLDER: &str = "{interface}";

/// Errors found while validating a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("monitor.interval must be greater than zero")]
    ZeroInterval,

    #[error("monitor.failure_threshold must be at least 1")]
    ZeroThreshold,

    #[error("probe.port must be non-zero")]
    ZeroPort,

    #[error("probe.host must not be empty")]
    EmptyHost,

    #[error("recovery.interface must not be empty")]
    EmptyInterface,

    #[error("recovery.{0} must contain at least a program name")]
    EmptyCommand(&'static str),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub probe: ProbeConfig,
    pub monitor: MonitorConfig,
    pub recovery: RecoveryConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub timeout: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "8.8.8.8".to_string(),
            port: 53,
            timeout: "3s".to_string(),
        }
    }
}

impl ProbeConfig {
    /// `host:port`, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn timeout(&self) -> Duration {
        parse_duration(&self.timeout).unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Time between polling ticks.
    pub interval: String,
    /// Consecutive failed probes that confirm an outage.
    pub failure_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: "10s".to_string(),
            failure_threshold: 2,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        parse_duration(&self.interval).unwrap_or(DEFAULT_INTERVAL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub interface: String,
    pub settle_after_disable: String,
    pub settle_after_enable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_command: Option<Vec<String>>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            interface: "Wi-Fi".to_string(),
            settle_after_disable: "5s".to_string(),
            settle_after_enable: "10s".to_string(),
            disable_command: None,
            enable_command: None,
        }
    }
}

impl RecoveryConfig {
    pub fn settle_after_disable(&self) -> Duration {
        parse_duration(&self.settle_after_disable).unwrap_or(DEFAULT_SETTLE_AFTER_DISABLE)
    }

    pub fn settle_after_enable(&self) -> Duration {
        parse_duration(&self.settle_after_enable).unwrap_or(DEFAULT_SETTLE_AFTER_ENABLE)
    }

    /// The command that takes the interface down, placeholders resolved.
    pub fn disable_command(&self) -> Vec<String> {
        match &self.disable_command {
            Some(cmd) => self.substitute(cmd),
            None => default_command(&self.interface, false),
        }
    }

    /// The command that brings the interface back up, placeholders resolved.
    pub fn enable_command(&self) -> Vec<String> {
        match &self.enable_command {
            Some(cmd) => self.substitute(cmd),
            None => default_command(&self.interface, true),
        }
    }

    fn substitute(&self, cmd: &[String]) -> Vec<String> {
        cmd.iter()
            .map(|arg| arg.replace(INTERFACE_PLACEHOLDER, &self.interface))
            .collect()
    }
}

#[cfg(windows)]
fn default_command(interface: &str, enable: bool) -> Vec<String> {
    let admin = if enable { "admin=enable" } else { "admin=disable" };
    ["netsh", "interface", "set", "interface", interface, admin]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(not(windows))]
fn default_command(interface: &str, enable: bool) -> Vec<String> {
    let action = if enable { "up" } else { "down" };
    ["ip", "link", "set", "dev", interface, action]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: "disconnection_history.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only log file. An empty path logs to stderr instead.
    pub file: String,
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "wifi_monitor.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The log file path, or `None` for stderr.
    pub fn file(&self) -> Option<&str> {
        Some(self.file.trim()).filter(|f| !f.is_empty())
    }
}

impl WatchConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WatchConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.probe.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.monitor.failure_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.recovery.interface.trim().is_empty() {
            return Err(ConfigError::EmptyInterface);
        }

        let durations = [
            ("probe.timeout", &self.probe.timeout),
            ("monitor.interval", &self.monitor.interval),
            ("recovery.settle_after_disable", &self.recovery.settle_after_disable),
            ("recovery.settle_after_enable", &self.recovery.settle_after_enable),
        ];
        for (field, value) in durations {
            if parse_duration(value).is_none() {
                return Err(ConfigError::InvalidDuration {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.monitor.interval().is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        if matches!(&self.recovery.disable_command, Some(cmd) if cmd.is_empty()) {
            return Err(ConfigError::EmptyCommand("disable_command"));
        }
        if matches!(&self.recovery.enable_command, Some(cmd) if cmd.is_empty()) {
            return Err(ConfigError::EmptyCommand("enable_command"));
        }
        Ok(())
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
