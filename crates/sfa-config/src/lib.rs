//! Shared configuration for the sfa command session tools.
//!
//! A TOML file plus `SFA_`-prefixed environment overrides, and translation
//! to `sfa_core::SessionConfig` and the engine endpoint address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sfa_core::{CoreError, EndpointAddr, RetryPolicy, SessionConfig};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Engine command endpoint, `unix:<path>` or `tcp:<host>:<port>`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Status push interval in milliseconds.
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    /// Live traffic in the service notification.
    #[serde(default = "default_dynamic_notification")]
    pub dynamic_notification: bool,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            status_interval_ms: default_status_interval_ms(),
            dynamic_notification: default_dynamic_notification(),
            retry: RetrySettings::default(),
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            step_ms: default_step_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSettings {
    /// Default filter directive when neither `-v` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to this file instead of stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_endpoint() -> String {
    let socket = ProjectDirs::from("io", "nekohasekai", "sfa").map_or_else(
        || PathBuf::from("/tmp/sfa/command.sock"),
        |dirs| dirs.data_dir().join("command.sock"),
    );
    format!("unix:{}", socket.display())
}

fn default_status_interval_ms() -> u64 {
    2000
}

fn default_dynamic_notification() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_step_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "warn".into()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Parse the configured endpoint.
    pub fn endpoint_addr(&self) -> Result<EndpointAddr, ConfigError> {
        self.endpoint
            .parse::<EndpointAddr>()
            .map_err(|err| match CoreError::from(err) {
                CoreError::InvalidEndpoint { endpoint, reason } => {
                    ConfigError::InvalidEndpoint { endpoint, reason }
                }
                other => ConfigError::Validation {
                    field: "endpoint".into(),
                    reason: other.to_string(),
                },
            })
    }

    /// Session behavior for `sfa_core::CommandClient`.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let session = SessionConfig {
            status_interval: Duration::from_millis(self.status_interval_ms),
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                step: Duration::from_millis(self.retry.step_ms),
            },
        };
        session.validate().map_err(|err| ConfigError::Validation {
            field: "session".into(),
            reason: err.to_string(),
        })?;
        Ok(session)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "nekohasekai", "sfa").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sfa");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error. Environment keys nest on a double
/// underscore: `SFA_RETRY__MAX_ATTEMPTS=3`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SFA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
