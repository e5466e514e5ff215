//! Configuration management for hotspot-connect
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{HotspotError, Result};
use crate::orchestrator::MAX_DURATION_MINUTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Holds connection settings for each external service plus the timing
/// and template settings that drive the hotspot orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat room settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Network controller manager (auth tickets, hostname lookup)
    #[serde(default)]
    pub network_controller: ServiceConfig,

    /// Location service (user presence)
    #[serde(default)]
    pub location: ServiceConfig,

    /// Infrastructure manager (device ids, template deployment, jobs)
    #[serde(default)]
    pub infrastructure: ServiceConfig,

    /// Orchestrator behavior
    #[serde(default)]
    pub hotspot: HotspotConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the chat REST API
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,

    /// Bearer token used for every chat call
    #[serde(default)]
    pub token: String,

    /// Display name of the room the orchestrator listens in
    #[serde(default = "default_room_name")]
    pub room_name: String,

    /// Accounts invited as moderators whenever the room is opened
    #[serde(default)]
    pub invite_emails: Vec<String>,
}

fn default_chat_api_url() -> String {
    "https://webexapis.com/v1".to_string()
}

fn default_room_name() -> String {
    "HotSpot-Connect".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_api_url(),
            token: String::new(),
            room_name: default_room_name(),
            invite_emails: Vec::new(),
        }
    }
}

/// Connection settings for a basic-auth protected REST service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service API
    #[serde(default)]
    pub api_url: String,

    /// Account name
    #[serde(default)]
    pub username: String,

    /// Account password
    #[serde(default)]
    pub password: String,
}

/// Orchestrator timing, fallback and template configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotspotConfig {
    /// Controller used when the requester cannot be located
    #[serde(default = "default_fallback_controller")]
    pub fallback_controller: String,

    /// Duration used when the operator gives no usable answer (minutes)
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u64,

    /// Delay between two reads of the latest chat message (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// How long to wait for the duration answer (seconds)
    #[serde(default = "default_duration_wait")]
    pub duration_wait_secs: u64,

    /// Delay before the enable job status is queried (seconds)
    #[serde(default = "default_settle_wait")]
    pub settle_wait_secs: u64,

    /// Number of status queries for the enable job; 1 queries exactly once
    #[serde(default = "default_status_poll_attempts")]
    pub status_poll_attempts: u32,

    /// Give up waiting for an activation command after this long (seconds)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Template that turns the hotspot SSID on
    #[serde(default = "default_enable_template")]
    pub enable_template: String,

    /// Template that turns the hotspot SSID off
    #[serde(default = "default_disable_template")]
    pub disable_template: String,
}

fn default_fallback_controller() -> String {
    "172.16.1.26".to_string()
}

fn default_duration_minutes() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    5
}

fn default_duration_wait() -> u64 {
    10
}

fn default_settle_wait() -> u64 {
    20
}

fn default_status_poll_attempts() -> u32 {
    1
}

fn default_idle_timeout() -> u64 {
    3600
}

fn default_enable_template() -> String {
    "EnableSSID".to_string()
}

fn default_disable_template() -> String {
    "DisableSSID".to_string()
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            fallback_controller: default_fallback_controller(),
            default_duration_minutes: default_duration_minutes(),
            poll_interval_secs: default_poll_interval(),
            duration_wait_secs: default_duration_wait(),
            settle_wait_secs: default_settle_wait(),
            status_poll_attempts: default_status_poll_attempts(),
            idle_timeout_secs: default_idle_timeout(),
            enable_template: default_enable_template(),
            disable_template: default_disable_template(),
        }
    }
}

impl HotspotConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Settle wait as a [`Duration`]
    pub fn settle_wait(&self) -> Duration {
        Duration::from_secs(self.settle_wait_secs)
    }

    /// Number of polls that fit in the duration wait (at least one)
    pub fn duration_polls(&self) -> u64 {
        polls_within(self.duration_wait_secs, self.poll_interval_secs)
    }

    /// Number of polls that fit in the idle timeout (at least one)
    pub fn idle_polls(&self) -> u64 {
        polls_within(self.idle_timeout_secs, self.poll_interval_secs)
    }
}

fn polls_within(window_secs: u64, interval_secs: u64) -> u64 {
    if interval_secs == 0 {
        return 1;
    }
    let polls = window_secs / interval_secs + u64::from(window_secs % interval_secs != 0);
    polls.max(1)
}

/// Shared HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    /// Accept self-signed certificates from lab appliances
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

fn default_http_timeout() -> u64 {
    30
}

fn default_accept_invalid_certs() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            accept_invalid_certs: default_accept_invalid_certs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Also append logs to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HotspotError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| HotspotError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        let string_overrides: [(&str, &mut String); 10] = [
            ("HOTSPOT_CHAT_TOKEN", &mut self.chat.token),
            ("HOTSPOT_CHAT_API_URL", &mut self.chat.api_url),
            ("HOTSPOT_ROOM_NAME", &mut self.chat.room_name),
            (
                "HOTSPOT_CONTROLLER_USERNAME",
                &mut self.network_controller.username,
            ),
            (
                "HOTSPOT_CONTROLLER_PASSWORD",
                &mut self.network_controller.password,
            ),
            ("HOTSPOT_LOCATION_USERNAME", &mut self.location.username),
            ("HOTSPOT_LOCATION_PASSWORD", &mut self.location.password),
            (
                "HOTSPOT_INFRASTRUCTURE_USERNAME",
                &mut self.infrastructure.username,
            ),
            (
                "HOTSPOT_INFRASTRUCTURE_PASSWORD",
                &mut self.infrastructure.password,
            ),
            (
                "HOTSPOT_FALLBACK_CONTROLLER",
                &mut self.hotspot.fallback_controller,
            ),
        ];

        for (name, slot) in string_overrides {
            if let Ok(value) = std::env::var(name) {
                *slot = value;
                tracing::debug!("Env override: {}", name);
            }
        }

        if let Ok(interval) = std::env::var("HOTSPOT_POLL_INTERVAL_SECS") {
            match interval.parse() {
                Ok(value) => self.hotspot.poll_interval_secs = value,
                Err(_) => tracing::warn!("Invalid HOTSPOT_POLL_INTERVAL_SECS: {}", interval),
            }
        }

        if let Ok(minutes) = std::env::var("HOTSPOT_DEFAULT_DURATION_MINUTES") {
            match minutes.parse() {
                Ok(value) => self.hotspot.default_duration_minutes = value,
                Err(_) => tracing::warn!("Invalid HOTSPOT_DEFAULT_DURATION_MINUTES: {}", minutes),
            }
        }

        if let Ok(level) = std::env::var("HOTSPOT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Config`] describing the first problem found
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("chat.api_url", &self.chat.api_url),
            ("network_controller.api_url", &self.network_controller.api_url),
            ("location.api_url", &self.location.api_url),
            ("infrastructure.api_url", &self.infrastructure.api_url),
        ];
        for (field, value) in urls {
            url::Url::parse(value).map_err(|e| {
                HotspotError::Config(format!("{} is not a valid URL ({}): {}", field, value, e))
            })?;
        }

        if self.chat.token.trim().is_empty() {
            return Err(HotspotError::Config("chat.token cannot be empty".to_string()).into());
        }

        if self.chat.room_name.trim().is_empty() {
            return Err(HotspotError::Config("chat.room_name cannot be empty".to_string()).into());
        }

        let hotspot = &self.hotspot;
        if hotspot.poll_interval_secs == 0 {
            return Err(HotspotError::Config(
                "hotspot.poll_interval_secs must be greater than 0".to_string(),
            )
            .into());
        }

        if hotspot.default_duration_minutes == 0 {
            return Err(HotspotError::Config(
                "hotspot.default_duration_minutes must be greater than 0".to_string(),
            )
            .into());
        }

        if hotspot.default_duration_minutes > MAX_DURATION_MINUTES {
            return Err(HotspotError::Config(format!(
                "hotspot.default_duration_minutes must be at most {}",
                MAX_DURATION_MINUTES
            ))
            .into());
        }

        if hotspot.status_poll_attempts == 0 {
            return Err(HotspotError::Config(
                "hotspot.status_poll_attempts must be at least 1".to_string(),
            )
            .into());
        }

        if hotspot.fallback_controller.trim().is_empty() {
            return Err(HotspotError::Config(
                "hotspot.fallback_controller cannot be empty".to_string(),
            )
            .into());
        }

        if hotspot.enable_template.trim().is_empty() || hotspot.disable_template.trim().is_empty()
        {
            return Err(HotspotError::Config(
                "hotspot enable/disable template names cannot be empty".to_string(),
            )
            .into());
        }

        if hotspot.enable_template == hotspot.disable_template {
            return Err(HotspotError::Config(
                "hotspot.enable_template and hotspot.disable_template must differ".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
