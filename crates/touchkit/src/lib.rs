//! touchkit: multi-touch gesture recognition.
//!
//! Re-exports the engine from `touchkit-core` and adds what an application
//! needs around it: input surfaces, ready-made adapters and (on wasm32) DOM
//! bindings.
//!
//! # Browser Usage (WASM)
//!
//! ```ignore
//! use touchkit::browser::{BrowserBinding, BrowserSurface, NavigatorVibrator};
//! use touchkit::{surface::shared, GestureEngine};
//!
//! let mut engine = GestureEngine::new();
//! engine.set_haptic_device(Box::new(NavigatorVibrator));
//! engine.on_double_tap(|p| web_sys::console::log_1(&format!("{p:?}").into()));
//! let binding = BrowserBinding::attach_element(element, shared(engine));
//! ```

#![allow(
    clippy::doc_markdown,
    clippy::cast_possible_wrap,
    clippy::needless_pass_by_value,
    clippy::type_complexity,
    clippy::unwrap_used,
    unreachable_pub
)]

pub use touchkit_core::*;

pub mod adapters;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod surface;

pub use adapters::{pinch_zoom, swipe_navigation, PullToRefresh};
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserBinding, BrowserSurface, NavigatorVibrator};
pub use surface::{EventSurface, SharedEngine, SurfaceBinding, TouchSurface};
