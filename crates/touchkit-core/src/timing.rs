//! Timestamped contact samples and the distance/velocity math built on them.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// One recorded contact position with its monotonic timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    /// Contact position.
    pub position: Point,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl TouchSample {
    /// Create a sample at `(x, y)` stamped `timestamp_ms`.
    #[must_use]
    pub const fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            position: Point::new(x, y),
            timestamp_ms,
        }
    }

    /// Create a sample from an existing point.
    #[must_use]
    pub const fn at(position: Point, timestamp_ms: u64) -> Self {
        Self {
            position,
            timestamp_ms,
        }
    }
}

/// Euclidean distance between two samples.
#[must_use]
pub fn distance(start: &TouchSample, end: &TouchSample) -> f32 {
    start.position.distance(&end.position)
}

/// Milliseconds from `start` to `end`, zero if `end` precedes `start`.
#[must_use]
pub const fn elapsed_ms(start: &TouchSample, end: &TouchSample) -> u64 {
    end.timestamp_ms.saturating_sub(start.timestamp_ms)
}

/// Average speed in px/ms. The duration is floored at 1 ms.
#[must_use]
pub fn velocity(start: &TouchSample, end: &TouchSample) -> f32 {
    let duration = elapsed_ms(start, end).max(1);
    distance(start, end) / duration as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_elapsed() {
        let a = TouchSample::new(0.0, 0.0, 0);
        let b = TouchSample::new(30.0, 40.0, 100);
        assert!((distance(&a, &b) - 50.0).abs() < 0.001);
        assert_eq!(elapsed_ms(&a, &b), 100);
    }

    #[test]
    fn test_elapsed_saturates_on_reordered_samples() {
        let a = TouchSample::new(0.0, 0.0, 500);
        let b = TouchSample::new(0.0, 0.0, 100);
        assert_eq!(elapsed_ms(&a, &b), 0);
    }

    #[test]
    fn test_velocity() {
        let a = TouchSample::new(0.0, 0.0, 0);
        let b = TouchSample::new(100.0, 0.0, 100);
        assert!((velocity(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_velocity_zero_duration_uses_one_ms() {
        let a = TouchSample::new(0.0, 0.0, 40);
        let b = TouchSample::new(8.0, 0.0, 40);
        assert!((velocity(&a, &b) - 8.0).abs() < 0.001);
    }
}
