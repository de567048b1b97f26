//! Adapter and surface behavior driven through the test harness.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use touchkit::surface::shared;
use touchkit::{
    pinch_zoom, swipe_navigation, EventSurface, GestureConfig, GestureEngine, GestureKind, Point,
    PullToRefresh, SurfaceBinding, TouchInput,
};
use touchkit_test::GestureHarness;

fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

// =============================================================================
// Swipe navigation
// =============================================================================

#[test]
fn test_swipe_navigation_left_and_right() {
    let (left, on_left) = counter();
    let (right, on_right) = counter();
    let engine = swipe_navigation(on_left, on_right, GestureConfig::default());
    let mut harness = GestureHarness::with_engine(engine);

    harness.drag((200.0, 100.0), (50.0, 100.0), 100, 4).settle();
    assert_eq!(left.load(Ordering::SeqCst), 1);
    assert_eq!(right.load(Ordering::SeqCst), 0);

    harness.drag((50.0, 100.0), (200.0, 100.0), 100, 4).settle();
    assert_eq!(left.load(Ordering::SeqCst), 1);
    assert_eq!(right.load(Ordering::SeqCst), 1);
}

#[test]
fn test_swipe_navigation_ignores_vertical() {
    let (left, on_left) = counter();
    let (right, on_right) = counter();
    let engine = swipe_navigation(on_left, on_right, GestureConfig::default());
    let mut harness = GestureHarness::with_engine(engine);

    harness.drag((100.0, 50.0), (100.0, 250.0), 100, 4).settle();
    harness.assert_count(GestureKind::Swipe, 1);
    assert_eq!(left.load(Ordering::SeqCst), 0);
    assert_eq!(right.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Pinch zoom
// =============================================================================

#[test]
fn test_pinch_zoom_reports_scale_and_center() {
    let zooms = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&zooms);
    let engine = pinch_zoom(
        move |scale, center| sink.lock().unwrap().push((scale, center)),
        GestureConfig::default(),
    );
    let mut harness = GestureHarness::with_engine(engine);

    harness.pinch((150.0, 100.0), 100.0, 150.0, 100, 2);

    let zooms = zooms.lock().unwrap();
    assert!(!zooms.is_empty());
    let (scale, center) = *zooms.last().unwrap();
    assert!((scale - 1.5).abs() < 0.001);
    assert_eq!(center, Point::new(150.0, 100.0));
}

// =============================================================================
// Pull to refresh
// =============================================================================

#[test]
fn test_pull_to_refresh_fires_once_until_reset() {
    let (refreshes, on_refresh) = counter();
    let mut refresh = PullToRefresh::with_default_threshold(on_refresh);
    let mut harness = GestureHarness::new();
    refresh.attach(harness.engine_mut());

    harness.drag((100.0, 0.0), (100.0, 150.0), 600, 6).settle();
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert!(refresh.is_refreshing());
    assert_eq!(refresh.pull_distance(), 0.0);

    harness.drag((100.0, 0.0), (100.0, 150.0), 600, 6).settle();
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    refresh.reset_refresh();
    harness.drag((100.0, 0.0), (100.0, 150.0), 600, 6).settle();
    assert_eq!(refreshes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pull_to_refresh_short_pull_does_nothing() {
    let (refreshes, on_refresh) = counter();
    let mut refresh = PullToRefresh::new(120.0, on_refresh, || true);
    let mut harness = GestureHarness::new();
    refresh.attach(harness.engine_mut());

    harness.drag((100.0, 0.0), (100.0, 90.0), 600, 3).settle();
    assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    assert!(!refresh.is_refreshing());
}

#[test]
fn test_pull_progress_is_capped() {
    let mut refresh = PullToRefresh::new(80.0, || {}, || true);
    let mut engine = GestureEngine::new();
    refresh.attach(&mut engine);

    engine.process(&TouchInput::start(0.0, 0.0, 0));
    engine.process(&TouchInput::moved(0.0, 20.0, 100));
    assert!((refresh.pull_progress() - 0.25).abs() < 0.001);

    engine.process(&TouchInput::moved(0.0, 500.0, 200));
    assert!((refresh.pull_distance() - 120.0).abs() < 0.001);
    assert!((refresh.pull_progress() - 1.0).abs() < f32::EPSILON);
}

// =============================================================================
// Surfaces
// =============================================================================

#[test]
fn test_surface_detach_removes_only_own_subscription() {
    let mut surface = EventSurface::new();
    let engine = shared(GestureEngine::new());
    let mut first = SurfaceBinding::attach(&mut surface, Arc::clone(&engine));
    let mut second = SurfaceBinding::attach(&mut surface, Arc::clone(&engine));
    assert_eq!(surface.listener_count(), 2);

    assert!(first.detach(&mut surface));
    assert!(!first.detach(&mut surface));
    assert!(!first.is_attached());
    assert_eq!(surface.listener_count(), 1);

    assert!(second.detach(&mut surface));
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn test_detached_surface_stops_feeding_engine() {
    let mut surface = EventSurface::new();
    let engine = shared(GestureEngine::new());
    let mut binding = SurfaceBinding::attach(&mut surface, Arc::clone(&engine));

    surface.dispatch(&TouchInput::start(0.0, 0.0, 0));
    assert_eq!(engine.lock().unwrap().touch_count(), 1);

    binding.detach(&mut surface);
    surface.dispatch(&TouchInput::end(0.0, 0.0, 40));
    assert_eq!(engine.lock().unwrap().touch_count(), 1);
}

#[cfg(not(target_arch = "wasm32"))]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_pull_never_exceeds_cap(steps in proptest::collection::vec(-80.0f32..200.0, 1..12)) {
            let mut refresh = PullToRefresh::with_default_threshold(|| {});
            let mut engine = GestureEngine::new();
            refresh.attach(&mut engine);

            engine.process(&TouchInput::start(0.0, 0.0, 0));
            let mut y = 0.0;
            for (i, dy) in steps.iter().enumerate() {
                y += dy;
                engine.process(&TouchInput::moved(0.0, y, 10 * (i as u64 + 1)));
                let pull = refresh.pull_distance();
                prop_assert!((0.0..=150.0).contains(&pull));
                prop_assert!(refresh.pull_progress() <= 1.0);
            }
        }
    }
}
