//! Two-finger scale tracking.

use crate::event::PinchData;
use crate::geometry::Point;

/// Pinch state held while exactly two contacts are down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    /// Contact distance when the second finger landed.
    pub initial_distance: f32,
    /// Scale last reported to listeners.
    pub current_scale: f32,
}

/// Reports scale changes between two contacts.
#[derive(Debug, Clone)]
pub struct PinchClassifier {
    /// Minimum change from the last reported scale.
    threshold: f32,
    state: Option<PinchState>,
}

impl PinchClassifier {
    /// Create a classifier with the given threshold.
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: None,
        }
    }

    /// Record the initial distance when the contact count reaches two.
    ///
    /// Coincident contacts give no usable reference; the pinch then stays
    /// silent until the count drops below two.
    pub fn begin(&mut self, first: Point, second: Point) {
        let initial_distance = first.distance(&second);
        self.state = Some(PinchState {
            initial_distance,
            current_scale: 1.0,
        });
    }

    /// Process a two-contact move. Returns an update when the scale moved
    /// by more than the threshold since the last report.
    pub fn update(&mut self, first: Point, second: Point) -> Option<PinchData> {
        let state = self.state.as_mut()?;
        if state.initial_distance <= f32::EPSILON {
            return None;
        }

        let scale = first.distance(&second) / state.initial_distance;
        if (scale - state.current_scale).abs() <= self.threshold {
            return None;
        }

        state.current_scale = scale;
        Some(PinchData {
            scale,
            center: first.midpoint(&second),
        })
    }

    /// Discard pinch state when the count drops below two.
    pub fn end(&mut self) {
        self.state = None;
    }

    /// Current pinch state, if two contacts are down.
    pub const fn state(&self) -> Option<&PinchState> {
        self.state.as_ref()
    }

    /// Whether a pinch is being tracked.
    pub const fn is_active(&self) -> bool {
        self.state.is_some()
    }
}
