//! A haptic device that records what it was asked to play.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use touchkit_core::{HapticDevice, HapticError, HapticIntensity};

/// Records every intensity it receives. Clones share the same log, so keep
/// one clone for assertions and hand the other to the engine.
///
/// Switch it to failing mode to check that device errors never reach
/// gesture recognition.
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    played: Arc<Mutex<Vec<HapticIntensity>>>,
    attempts: Arc<Mutex<usize>>,
    failing: Arc<AtomicBool>,
}

impl RecordingHaptics {
    /// Create a working device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device that rejects every request.
    pub fn failing() -> Self {
        let device = Self::default();
        device.set_failing(true);
        device
    }

    /// Make subsequent requests fail or succeed.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Intensities played successfully, in order.
    pub fn played(&self) -> Vec<HapticIntensity> {
        self.played.lock().expect("haptics log mutex not poisoned").clone()
    }

    /// Requests received, including failed ones.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("haptics log mutex not poisoned")
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.played.lock().expect("haptics log mutex not poisoned").clear();
        *self.attempts.lock().expect("haptics log mutex not poisoned") = 0;
    }
}

impl HapticDevice for RecordingHaptics {
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), HapticError> {
        *self.attempts.lock().expect("haptics log mutex not poisoned") += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(HapticError::Device("recording device set to fail".to_string()));
        }
        self.played
            .lock()
            .expect("haptics log mutex not poisoned")
            .push(intensity);
        Ok(())
    }
}
