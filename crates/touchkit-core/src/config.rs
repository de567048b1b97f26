//! Recognition thresholds, delays and feedback switches.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for gesture recognition.
///
/// Every field is optional when deserializing; missing fields take their
/// [`Default`] value. Unknown keys are rejected so typos surface early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Minimum end-to-end distance for a swipe (in pixels).
    pub swipe_distance_threshold: f32,
    /// Minimum average velocity for a swipe (px/ms).
    pub swipe_velocity_threshold: f32,
    /// Minimum scale change between two pinch updates.
    pub pinch_threshold: f32,
    /// Distance from the start point that turns a touch into a pan.
    pub pan_activation_distance: f32,
    /// Stationary hold time before a long press fires.
    pub long_press_delay_ms: u64,
    /// Maximum gap between two tap ends for a double tap.
    pub double_tap_window_ms: u64,
    /// Delay before a lone tap is confirmed.
    pub tap_confirm_delay_ms: u64,
    /// Dispatch haptic feedback for confirmed gestures.
    pub enable_haptics: bool,
    /// Register non-passive listeners and prevent default scrolling.
    pub prevent_default_scrolling: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_distance_threshold: 50.0,
            swipe_velocity_threshold: 0.5,
            pinch_threshold: 0.1,
            pan_activation_distance: 10.0,
            long_press_delay_ms: 500,
            double_tap_window_ms: 300,
            tap_confirm_delay_ms: 250,
            enable_haptics: true,
            prevent_default_scrolling: false,
        }
    }
}

impl GestureConfig {
    /// Set the swipe distance threshold.
    #[must_use]
    pub const fn with_swipe_distance_threshold(mut self, px: f32) -> Self {
        self.swipe_distance_threshold = px;
        self
    }

    /// Set the swipe velocity threshold.
    #[must_use]
    pub const fn with_swipe_velocity_threshold(mut self, px_per_ms: f32) -> Self {
        self.swipe_velocity_threshold = px_per_ms;
        self
    }

    /// Set the pinch threshold.
    #[must_use]
    pub const fn with_pinch_threshold(mut self, threshold: f32) -> Self {
        self.pinch_threshold = threshold;
        self
    }

    /// Set the pan activation distance.
    #[must_use]
    pub const fn with_pan_activation_distance(mut self, px: f32) -> Self {
        self.pan_activation_distance = px;
        self
    }

    /// Set the long-press delay.
    #[must_use]
    pub const fn with_long_press_delay_ms(mut self, ms: u64) -> Self {
        self.long_press_delay_ms = ms;
        self
    }

    /// Set the double-tap window.
    #[must_use]
    pub const fn with_double_tap_window_ms(mut self, ms: u64) -> Self {
        self.double_tap_window_ms = ms;
        self
    }

    /// Set the tap confirmation delay.
    #[must_use]
    pub const fn with_tap_confirm_delay_ms(mut self, ms: u64) -> Self {
        self.tap_confirm_delay_ms = ms;
        self
    }

    /// Enable or disable haptic feedback.
    #[must_use]
    pub const fn with_haptics(mut self, enabled: bool) -> Self {
        self.enable_haptics = enabled;
        self
    }

    /// Enable or disable default-scroll prevention.
    #[must_use]
    pub const fn with_prevent_default_scrolling(mut self, prevent: bool) -> Self {
        self.prevent_default_scrolling = prevent;
        self
    }

    /// Longest delay the engine may schedule.
    #[must_use]
    pub fn max_delay_ms(&self) -> u64 {
        self.long_press_delay_ms
            .max(self.double_tap_window_ms)
            .max(self.tap_confirm_delay_ms)
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("swipe_distance_threshold", self.swipe_distance_threshold),
            ("swipe_velocity_threshold", self.swipe_velocity_threshold),
            ("pinch_threshold", self.pinch_threshold),
            ("pan_activation_distance", self.pan_activation_distance),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("must be a positive finite number, got {value}"),
                });
            }
        }

        let delays = [
            ("long_press_delay_ms", self.long_press_delay_ms),
            ("double_tap_window_ms", self.double_tap_window_ms),
            ("tap_confirm_delay_ms", self.tap_confirm_delay_ms),
        ];
        for (field, value) in delays {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let source = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&source),
            "toml" => Self::from_toml_str(&source),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}
