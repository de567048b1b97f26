//! Best-effort haptic feedback for confirmed gestures.

use crate::error::HapticError;
use crate::event::GestureKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feedback strength requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticIntensity {
    /// Light tick for selections.
    Selection,
    /// Firmer bump for committed actions.
    Impact,
    /// Triple pulse for notifications.
    Notification,
}

impl HapticIntensity {
    /// Vibration pattern in milliseconds (on, off, on, ...).
    pub const fn pattern(self) -> &'static [u32] {
        match self {
            Self::Selection => &[10],
            Self::Impact => &[25],
            Self::Notification => &[50, 50, 50],
        }
    }

    /// Intensity used to confirm a gesture, if any.
    pub const fn for_gesture(kind: GestureKind) -> Option<Self> {
        match kind {
            GestureKind::Tap | GestureKind::DoubleTap => Some(Self::Selection),
            GestureKind::LongPress | GestureKind::Swipe => Some(Self::Impact),
            GestureKind::PanStart
            | GestureKind::PanMove
            | GestureKind::PanEnd
            | GestureKind::Pinch => None,
        }
    }
}

/// A physical vibration device.
pub trait HapticDevice: Send {
    /// Play the pattern for `intensity`. Fire-and-forget.
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), HapticError>;
}

/// Device for platforms without vibration support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticDevice for NoHaptics {
    fn emit(&mut self, _intensity: HapticIntensity) -> Result<(), HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// Maps confirmed gestures to haptic intensities and dispatches them.
pub struct FeedbackEmitter {
    enabled: bool,
    device: Box<dyn HapticDevice>,
    /// Swallowed device failures, for diagnostics.
    failures: u64,
}

impl fmt::Debug for FeedbackEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackEmitter")
            .field("enabled", &self.enabled)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl Default for FeedbackEmitter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FeedbackEmitter {
    /// Create an emitter with no device attached.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            device: Box::new(NoHaptics),
            failures: 0,
        }
    }

    /// Attach the device feedback is sent to.
    pub fn set_device(&mut self, device: Box<dyn HapticDevice>) {
        self.device = device;
    }

    /// Enable or disable dispatch.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether dispatch is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of device failures swallowed so far.
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Send the confirmation feedback for `kind`, if it has one.
    pub fn confirm(&mut self, kind: GestureKind) {
        if let Some(intensity) = HapticIntensity::for_gesture(kind) {
            self.trigger(intensity);
        }
    }

    /// Send `intensity` to the device. Returns whether the device accepted it.
    ///
    /// Device errors are logged and swallowed.
    pub fn trigger(&mut self, intensity: HapticIntensity) -> bool {
        if !self.enabled {
            return false;
        }
        match self.device.emit(intensity) {
            Ok(()) => true,
            Err(err) => {
                self.failures += 1;
                tracing::debug!(?intensity, error = %err, "haptic feedback dropped");
                false
            }
        }
    }
}
