//! # Configuration Management
//!
//! Protocol constants and runtime configuration for the device listener.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment variable overrides via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - `MAX_PAYLOAD_LEN` caps the allocation a single announced frame length
//!   can force, so a corrupt or hostile length field cannot exhaust memory.
//! - `MIN_PAYLOAD_LEN` guarantees every accepted payload is large enough to
//!   carry the inner header the device id is extracted from.

use crate::error::{ListenerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Protocol version accepted in the outer header
pub const PROTOCOL_VERSION: u8 = 0x00;

/// Size of the outer header on the wire: version, reserved, length(u16)
pub const OUTER_HEADER_LEN: usize = 4;

/// Size of the inner payload header: deviceId(u16), measurementTag(u16),
/// timestamp(u32), measurementType(u16), dataLength(u16)
pub const INNER_HEADER_LEN: usize = 12;

/// Smallest payload a valid frame may announce (the inner header itself)
pub const MIN_PAYLOAD_LEN: usize = INNER_HEADER_LEN;

/// Largest payload a valid frame may announce (4 KiB)
pub const MAX_PAYLOAD_LEN: usize = 4096;

/// Main configuration structure for the listener process
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ListenerConfig {
    /// Server-specific configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Device directory configuration
    #[serde(default)]
    pub devices: DevicesConfig,

    /// Statistics reporting configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ListenerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ListenerError::Config(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ListenerError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("DEVICE_LISTENER_ADDRESS") {
            config.server.address = addr;
        }

        if let Ok(file) = std::env::var("DEVICE_LISTENER_DEVICES_FILE") {
            config.devices.file = file;
        }

        if let Ok(interval) = std::env::var("DEVICE_LISTENER_REPORT_INTERVAL_SECS") {
            if let Ok(val) = interval.parse::<u64>() {
                config.report.interval = Duration::from_secs(val);
            }
        }

        if let Ok(level) = std::env::var("DEVICE_LISTENER_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.devices.validate());
        errors.extend(self.report.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return a Result
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ListenerError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:5555"
    pub address: String,

    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from("0.0.0.0:5555"),
            max_connections: 1000,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid server address format: '{}' (expected format: '0.0.0.0:5555')",
                self.address
            ));
        }

        if self.max_connections == 0 {
            errors.push("Maximum connection count must be greater than 0".to_string());
        }

        errors
    }
}

/// Device directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Path to the `deviceId:deviceName` description file
    pub file: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            file: String::from("./devices.conf"),
        }
    }
}

impl DevicesConfig {
    /// Validate device directory configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.file.is_empty() {
            errors.push("Device description file path cannot be empty".to_string());
        }
        errors
    }
}

/// Statistics reporting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Interval between statistics prints
    #[serde(with = "duration_serde")]
    pub interval: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

impl ReportConfig {
    /// Validate reporting configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.interval.is_zero() {
            errors.push("Report interval must be greater than 0".to_string());
        } else if self.interval.as_secs() > 3600 {
            errors.push("Report interval too long (maximum: 1 hour)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is not set, e.g. "info"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let known = ["trace", "debug", "info", "warn", "error"];
        let base = self.level.split(',').next().unwrap_or("");
        if !known.contains(&base.to_ascii_lowercase().as_str()) && !base.contains('=') {
            errors.push(format!(
                "Unknown log level: '{}' (expected one of: trace, debug, info, warn, error)",
                self.level
            ));
        }

        errors
    }
}

/// Serde helper for Duration serialization as milliseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
