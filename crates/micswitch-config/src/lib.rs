use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Error types for configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings consumed by the audio clients, the use cases and the switch
/// command builder. Timeouts are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub list_timeout: f64,
    pub set_source_timeout: f64,
    pub move_stream_timeout: f64,
    pub max_sources_display: u32,
    /// Milliseconds.
    pub notification_expire_time: u32,
    pub notify_on_switch: bool,
    /// Use `pactl list sources` instead of `pactl list short sources`.
    pub pactl_detailed_listing: bool,
    pub pactl_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_audio_source_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_timeout: 0.15,
            set_source_timeout: 0.5,
            move_stream_timeout: 0.5,
            max_sources_display: 10,
            notification_expire_time: 800,
            notify_on_switch: false,
            pactl_detailed_listing: true,
            pactl_path: "pactl".to_string(),
            switch_audio_source_path: None,
        }
    }
}

impl Config {
    /// Default location: `<config dir>/micswitch/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("micswitch")
            .join("config.toml")
    }

    /// Load and validate a configuration file. A missing file yields the
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Self::default_path())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("list_timeout", self.list_timeout)?;
        positive("set_source_timeout", self.set_source_timeout)?;
        positive("move_stream_timeout", self.move_stream_timeout)?;

        if self.max_sources_display < 1 {
            return Err(ConfigError::Invalid {
                field: "max_sources_display",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.pactl_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "pactl_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn list_timeout(&self) -> Duration {
        seconds(self.list_timeout)
    }

    pub fn set_source_timeout(&self) -> Duration {
        seconds(self.set_source_timeout)
    }

    pub fn move_stream_timeout(&self) -> Duration {
        seconds(self.move_stream_timeout)
    }

    pub fn notification_expire(&self) -> Duration {
        Duration::from_millis(u64::from(self.notification_expire_time))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN and infinity are not finite.
    if !value.is_finite() || value <= 0.0 || Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be a number of seconds greater than 0, got {}", value),
        });
    }
    Ok(())
}

/// Unvalidated values that do not fit a `Duration` saturate.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
