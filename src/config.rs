//! # Configuration Management
//!
//! Wire constants and the runtime limits of the codec.
//!
//! Limits are carried by value: a [`ProtocolConfig`] is handed to
//! [`MessageCodec::new`](crate::protocol::codec::MessageCodec::new) and nothing
//! is looked up from process-wide state.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`ROCK_WIRE_*`)
//!
//! ## Security Considerations
//! - `max_protocol_length` bounds the allocation made for a frame body and the
//!   output of gzip decompression
//! - Lengths with the sign bit set are rejected regardless of the limit

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Current supported protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Magic bytes opening every frame
pub const MAGIC_BYTES: [u8; 2] = [0xAB, 0xCD];

/// Size of the fixed frame header: magic(2) version(1) flags(1) length(4)
pub const HEADER_LEN: usize = 8;

/// Header flag bit: body is gzip-compressed
pub const FLAG_GZIP: u8 = 0x01;

/// Default upper bound on a frame body (64 MiB)
pub const DEFAULT_MAX_PROTOCOL_LENGTH: u32 = 64 * 1024 * 1024;

/// Default body size from which gzip is applied (4 KiB)
pub const DEFAULT_GZIP_THRESHOLD: usize = 4 * 1024;

/// Default chunk size for freshly created buffers
pub const DEFAULT_BUFFER_BASE_SIZE: usize = 4096;

/// Top-level configuration: codec limits plus logging
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RockConfig {
    /// Wire codec limits
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RockConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max) = std::env::var("ROCK_WIRE_MAX_PROTOCOL_LENGTH") {
            config.protocol.max_protocol_length = max.parse::<u32>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid ROCK_WIRE_MAX_PROTOCOL_LENGTH: {e}"))
            })?;
        }

        if let Ok(threshold) = std::env::var("ROCK_WIRE_GZIP_THRESHOLD") {
            config.protocol.gzip_threshold = threshold.parse::<usize>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid ROCK_WIRE_GZIP_THRESHOLD: {e}"))
            })?;
        }

        if let Ok(base) = std::env::var("ROCK_WIRE_BUFFER_BASE_SIZE") {
            config.protocol.buffer_base_size = base.parse::<usize>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid ROCK_WIRE_BUFFER_BASE_SIZE: {e}"))
            })?;
        }

        if let Ok(level) = std::env::var("ROCK_WIRE_LOG_LEVEL") {
            config.logging.log_level = level
                .parse::<Level>()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid log level: {level}")))?;
        }

        Ok(config)
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

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.protocol.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Limits consumed by the wire codec
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
    /// Decode-side bound on the body length field (exclusive)
    pub max_protocol_length: u32,

    /// Encode-side body size from which gzip is applied (inclusive)
    pub gzip_threshold: usize,

    /// Chunk size for buffers created by the codec
    #[serde(default = "default_base_size")]
    pub buffer_base_size: usize,
}

fn default_base_size() -> usize {
    DEFAULT_BUFFER_BASE_SIZE
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_protocol_length: DEFAULT_MAX_PROTOCOL_LENGTH,
            gzip_threshold: DEFAULT_GZIP_THRESHOLD,
            buffer_base_size: DEFAULT_BUFFER_BASE_SIZE,
        }
    }
}

impl ProtocolConfig {
    /// Validate codec limits
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_protocol_length == 0 {
            errors.push("Max protocol length cannot be 0".to_string());
        } else if self.max_protocol_length > i32::MAX as u32 {
            errors.push(format!(
                "Max protocol length too large: {} (maximum: {})",
                self.max_protocol_length,
                i32::MAX
            ));
        }

        if self.gzip_threshold == 0 {
            errors.push("Gzip threshold cannot be 0 (every frame would be compressed)".to_string());
        }

        if self.buffer_base_size == 0 {
            errors.push("Buffer base size must be greater than 0".to_string());
        } else if self.buffer_base_size > 16 * 1024 * 1024 {
            errors.push(format!(
                "Buffer base size too large: {} bytes (maximum: 16 MB)",
                self.buffer_base_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("rock-wire"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
