use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for ofwalld
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Rule source settings
    #[serde(default)]
    pub rules: RulesConfig,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Rule source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Path to the rule file
    #[serde(default = "default_rules_file")]
    pub file: PathBuf,

    /// Reload the rule file when it changes on disk
    #[serde(default = "default_true")]
    pub hot_reload: bool,

    /// Debounce between a file event and the reload
    #[serde(default = "default_debounce", with = "humantime_serde")]
    pub debounce: Duration,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            file: default_rules_file(),
            hot_reload: true,
            debounce: default_debounce(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Global settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Capacity of the transport event queue
    #[serde(default = "default_event_queue")]
    pub event_queue: usize,

    /// Grace period for draining switch sessions on shutdown
    #[serde(default = "default_drain_timeout", with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            event_queue: default_event_queue(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

fn default_rules_file() -> PathBuf {
    PathBuf::from("firewall_rules.txt")
}

fn default_true() -> bool {
    true
}

fn default_debounce() -> Duration {
    Duration::from_millis(500)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_queue() -> usize {
    256
}

fn default_drain_timeout() -> Duration {
    Duration::from_secs(10)
}
