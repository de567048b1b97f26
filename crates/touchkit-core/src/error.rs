//! Error types for touchkit-core.
//!
//! Recognition itself never fails. These cover the fallible edges: loading
//! configuration and talking to a haptic device.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::GestureConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field holds a value the engine cannot work with.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Config file extension is neither YAML nor TOML.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Errors reported by a [`crate::HapticDevice`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HapticError {
    /// The platform has no vibration support.
    #[error("Haptics not supported on this platform")]
    Unsupported,

    /// The device refused or failed the request.
    #[error("Haptic device failure: {0}")]
    Device(String),
}
