//! Core engine for touchkit multi-touch gesture recognition.
//!
//! This crate turns phase-tagged touch frames into gestures:
//! - Input: [`TouchInput`] frames of [`TouchSample`]s
//! - Recognition: [`GestureEngine`] with tap, double-tap, long-press, pan,
//!   swipe and pinch
//! - Deferred work: [`TimerQueue`] driven by host timestamps
//! - Output: [`GestureEvent`]s, per-kind listeners and haptic feedback
//! - Configuration: [`GestureConfig`] loaded from YAML or TOML

mod config;
mod engine;
mod error;
mod event;
mod geometry;
mod haptics;
mod listener;
mod pinch;
mod session;
mod single;
mod swipe;
mod timer;
pub mod timing;

pub use config::GestureConfig;
pub use engine::GestureEngine;
pub use error::{ConfigError, HapticError};
pub use event::{
    GestureEvent, GestureKind, PinchData, SwipeData, SwipeDirection, TouchInput, TouchPhase,
};
pub use geometry::Point;
pub use haptics::{FeedbackEmitter, HapticDevice, HapticIntensity, NoHaptics};
pub use listener::{DispatchReport, GestureHandler, ListenerId, ListenerRegistry};
pub use pinch::{PinchClassifier, PinchState};
pub use session::{SessionState, SingleFingerPhase};
pub use single::{GestureTimer, SingleFingerClassifier};
pub use swipe::SwipeResolver;
pub use timer::{TimerHandle, TimerQueue};
pub use timing::TouchSample;
