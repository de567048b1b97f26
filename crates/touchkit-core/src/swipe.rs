//! End-of-pan swipe qualification.

use crate::event::{SwipeData, SwipeDirection};
use crate::timing::{self, TouchSample};

/// Decides whether a finished pan was a swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeResolver {
    /// Distance that must be exceeded (pixels).
    pub distance_threshold: f32,
    /// Average velocity that must be exceeded (px/ms).
    pub velocity_threshold: f32,
}

impl Default for SwipeResolver {
    fn default() -> Self {
        Self::new(50.0, 0.5)
    }
}

impl SwipeResolver {
    /// Create a resolver with explicit thresholds.
    pub const fn new(distance_threshold: f32, velocity_threshold: f32) -> Self {
        Self {
            distance_threshold,
            velocity_threshold,
        }
    }

    /// Resolve a pan from `start` to `end`.
    ///
    /// Both thresholds are strict. When `|dx| == |dy|` the horizontal axis
    /// wins.
    pub fn resolve(&self, start: &TouchSample, end: &TouchSample) -> Option<SwipeData> {
        let distance = timing::distance(start, end);
        let velocity = timing::velocity(start, end);
        if distance <= self.distance_threshold || velocity <= self.velocity_threshold {
            return None;
        }

        Some(SwipeData {
            direction: direction_of(start, end),
            distance,
            velocity,
            duration_ms: timing::elapsed_ms(start, end),
        })
    }
}

fn direction_of(start: &TouchSample, end: &TouchSample) -> SwipeDirection {
    let delta = end.position - start.position;
    if delta.x.abs() >= delta.y.abs() {
        if delta.x > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if delta.y > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}
