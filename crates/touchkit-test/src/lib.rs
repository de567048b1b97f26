#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::new_without_default)]
//! Testing harness for touchkit gesture recognition.
//!
//! [`GestureHarness`] owns an engine and a virtual clock and scripts whole
//! touch sessions:
//!
//! ```
//! use touchkit_core::GestureKind;
//! use touchkit_test::GestureHarness;
//!
//! let mut harness = GestureHarness::new();
//! harness.double_tap(20.0, 20.0).settle();
//! assert_eq!(harness.kinds(), vec![GestureKind::DoubleTap]);
//! ```
//!
//! [`RecordingHaptics`] stands in for a vibration motor and
//! [`GestureRecorder`] captures what listeners receive.

mod harness;
mod haptics;
mod recorder;

pub use harness::{GestureHarness, TimedGesture};
pub use haptics::RecordingHaptics;
pub use recorder::GestureRecorder;
