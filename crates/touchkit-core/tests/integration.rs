//! Integration tests for touchkit-core.
//!
//! These drive the public engine API with complete touch sessions.

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use touchkit_core::{
    GestureConfig, GestureEngine, GestureEvent, GestureKind, HapticDevice, HapticError,
    HapticIntensity, Point, SwipeDirection, SwipeResolver, TimerQueue, TouchInput, TouchPhase,
    TouchSample,
};

fn run(engine: &mut GestureEngine, trace: &[TouchInput]) -> Vec<GestureEvent> {
    trace.iter().flat_map(|input| engine.process(input)).collect()
}

fn count(events: &[GestureEvent], kind: GestureKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

fn pair(phase: TouchPhase, a: (f32, f32), b: (f32, f32), t: u64) -> TouchInput {
    TouchInput::new(
        phase,
        vec![TouchSample::new(a.0, a.1, t), TouchSample::new(b.0, b.1, t)],
        2,
    )
}

#[derive(Clone, Default)]
struct SharedHaptics(Arc<Mutex<Vec<HapticIntensity>>>);

impl HapticDevice for SharedHaptics {
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), HapticError> {
        self.0.lock().unwrap().push(intensity);
        Ok(())
    }
}

struct BrokenHaptics;

impl HapticDevice for BrokenHaptics {
    fn emit(&mut self, _intensity: HapticIntensity) -> Result<(), HapticError> {
        Err(HapticError::Device("motor stalled".to_string()))
    }
}

// =============================================================================
// Tap / Double Tap
// =============================================================================

#[test]
fn test_lone_tap_waits_for_confirm_delay() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[TouchInput::start(40.0, 40.0, 0), TouchInput::end(41.0, 40.0, 60)],
    );
    assert!(events.is_empty());

    // The confirm delay is stretched to cover the 300ms double-tap window.
    assert!(engine.advance_to(60 + 299).is_empty());
    assert_eq!(
        engine.advance_to(60 + 300),
        vec![GestureEvent::Tap {
            position: Point::new(41.0, 40.0)
        }]
    );
}

#[test]
fn test_double_tap_replaces_both_taps() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(10.0, 10.0, 0),
            TouchInput::end(10.0, 10.0, 50),
            TouchInput::start(12.0, 11.0, 120),
            TouchInput::end(12.0, 11.0, 170),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::DoubleTap), 1);
    assert_eq!(count(&events, GestureKind::Tap), 0);
    assert_eq!(
        events[0],
        GestureEvent::DoubleTap {
            position: Point::new(12.0, 11.0)
        }
    );
}

#[test]
fn test_double_tap_near_window_edge() {
    // Second tap ends 280ms after the first, after the 250ms confirm delay.
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::end(0.0, 0.0, 50),
            TouchInput::start(0.0, 0.0, 200),
            TouchInput::end(0.0, 0.0, 330),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::DoubleTap), 1);
    assert_eq!(count(&events, GestureKind::Tap), 0);

    // Second press starts after the confirm delay but still ends in the window.
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::end(0.0, 0.0, 50),
            TouchInput::start(0.0, 0.0, 310),
            TouchInput::end(0.0, 0.0, 340),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::DoubleTap), 1);
    assert_eq!(count(&events, GestureKind::Tap), 0);
}

#[test]
fn test_taps_outside_window_are_separate() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[TouchInput::start(0.0, 0.0, 0), TouchInput::end(0.0, 0.0, 50)],
    );
    events.extend(run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 400),
            TouchInput::end(0.0, 0.0, 450),
        ],
    ));
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::Tap), 2);
    assert_eq!(count(&events, GestureKind::DoubleTap), 0);
}

#[test]
fn test_reset_tap_history_prevents_double_tap() {
    let mut engine = GestureEngine::new();
    run(
        &mut engine,
        &[TouchInput::start(0.0, 0.0, 0), TouchInput::end(0.0, 0.0, 50)],
    );
    engine.reset_tap_history();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 100),
            TouchInput::end(0.0, 0.0, 150),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::DoubleTap), 0);
    assert_eq!(count(&events, GestureKind::Tap), 1);
}

#[test]
fn test_long_press_between_taps_breaks_double_tap() {
    let config = GestureConfig::default().with_long_press_delay_ms(100);
    let mut engine = GestureEngine::with_config(config);
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::end(0.0, 0.0, 10),
            TouchInput::start(0.0, 0.0, 20),
            TouchInput::end(0.0, 0.0, 130),
            TouchInput::start(0.0, 0.0, 140),
            TouchInput::end(0.0, 0.0, 160),
        ],
    );
    events.extend(engine.advance_to(5_000));

    let kinds: Vec<GestureKind> = events.iter().map(GestureEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![GestureKind::LongPress, GestureKind::Tap, GestureKind::Tap]
    );
}

#[test]
fn test_pinch_between_taps_breaks_double_tap() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::end(0.0, 0.0, 10),
            pair(TouchPhase::Start, (0.0, 0.0), (100.0, 0.0), 20),
            pair(TouchPhase::Move, (0.0, 0.0), (150.0, 0.0), 30),
            TouchInput::new(TouchPhase::End, vec![TouchSample::new(150.0, 0.0, 40)], 1),
            TouchInput::end(0.0, 0.0, 50),
            TouchInput::start(0.0, 0.0, 60),
            TouchInput::end(0.0, 0.0, 70),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(count(&events, GestureKind::DoubleTap), 0);
    assert_eq!(count(&events, GestureKind::Tap), 2);
    assert_eq!(count(&events, GestureKind::Pinch), 1);
}

// =============================================================================
// Long Press
// =============================================================================

#[test]
fn test_long_press_is_terminal() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(50.0, 50.0, 0),
            TouchInput::moved(54.0, 53.0, 200),
            TouchInput::moved(52.0, 51.0, 600),
            TouchInput::moved(250.0, 51.0, 650),
            TouchInput::end(300.0, 51.0, 700),
        ],
    );
    events.extend(engine.advance_to(5_000));

    assert_eq!(
        events,
        vec![GestureEvent::LongPress {
            position: Point::new(54.0, 53.0)
        }]
    );
}

#[test]
fn test_long_press_fires_from_advance() {
    let mut engine = GestureEngine::new();
    engine.process(&TouchInput::start(5.0, 5.0, 1_000));
    assert!(engine.advance_to(1_499).is_empty());
    assert_eq!(count(&engine.advance_to(1_500), GestureKind::LongPress), 1);
    assert!(engine.advance_to(3_000).is_empty());

    let events = engine.process(&TouchInput::end(5.0, 5.0, 3_100));
    assert!(events.is_empty());
    assert!(engine.advance_to(10_000).is_empty());
}

#[test]
fn test_pan_cancels_long_press() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(0.0, 30.0, 100),
        ],
    );
    assert_eq!(count(&events, GestureKind::PanStart), 1);
    assert_eq!(engine.next_deadline(), None);
    assert!(engine.advance_to(2_000).is_empty());
}

// =============================================================================
// Pan / Swipe
// =============================================================================

#[test]
fn test_swipe_right_example() {
    let resolver = SwipeResolver::default();
    let swipe = resolver
        .resolve(
            &TouchSample::new(0.0, 0.0, 0),
            &TouchSample::new(100.0, 0.0, 100),
        )
        .unwrap();
    assert_eq!(swipe.direction, SwipeDirection::Right);
    assert!((swipe.distance - 100.0).abs() < 0.001);
    assert!((swipe.velocity - 1.0).abs() < 0.001);
    assert_eq!(swipe.duration_ms, 100);

    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(50.0, 0.0, 50),
            TouchInput::end(100.0, 0.0, 100),
        ],
    );
    assert_eq!(
        events.last(),
        Some(&GestureEvent::Swipe(swipe)),
        "engine and resolver agree"
    );
}

#[test]
fn test_sub_threshold_pan_has_no_swipe() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(12.0, 0.0, 250),
            TouchInput::end(20.0, 0.0, 500),
        ],
    );
    events.extend(engine.advance_to(5_000));

    let kinds: Vec<_> = events.iter().map(GestureEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![GestureKind::PanStart, GestureKind::PanMove, GestureKind::PanEnd]
    );
}

#[test]
fn test_slow_long_pan_has_no_swipe() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(100.0, 0.0, 300),
            TouchInput::end(200.0, 0.0, 1_000),
        ],
    );
    assert_eq!(count(&events, GestureKind::PanEnd), 1);
    assert_eq!(count(&events, GestureKind::Swipe), 0);
}

#[test]
fn test_pan_deltas_sum_to_displacement() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(10.0, 10.0, 0),
            TouchInput::moved(15.0, 12.0, 10),
            TouchInput::moved(30.0, 20.0, 20),
            TouchInput::moved(32.0, 25.0, 30),
            TouchInput::moved(40.0, 35.0, 40),
            TouchInput::end(40.0, 35.0, 500),
        ],
    );

    let total = events
        .iter()
        .filter_map(|e| match e {
            GestureEvent::PanMove { delta, .. } => Some(*delta),
            _ => None,
        })
        .fold(Point::ORIGIN, |acc, d| acc + d);
    assert!((total.x - 30.0).abs() < 0.001);
    assert!((total.y - 25.0).abs() < 0.001);
    assert_eq!(
        events[0],
        GestureEvent::PanStart {
            position: Point::new(10.0, 10.0)
        }
    );
}

#[test]
fn test_cancel_ends_pan_without_swipe() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(80.0, 0.0, 20),
            TouchInput::cancel(150.0, 0.0, 40),
        ],
    );
    assert_eq!(count(&events, GestureKind::PanEnd), 1);
    assert_eq!(count(&events, GestureKind::Swipe), 0);
    assert!(!engine.is_pressed());
}

#[test]
fn test_cancelled_press_is_not_a_tap() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::cancel(0.0, 0.0, 40),
        ],
    );
    events.extend(engine.advance_to(5_000));
    assert!(events.is_empty());
}

// =============================================================================
// Pinch
// =============================================================================

#[test]
fn test_pinch_reports_scale_once() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            pair(TouchPhase::Start, (100.0, 100.0), (200.0, 100.0), 0),
            pair(TouchPhase::Move, (75.0, 100.0), (225.0, 100.0), 30),
        ],
    );

    assert_eq!(events.len(), 1);
    let GestureEvent::Pinch(update) = events[0] else {
        panic!("expected pinch, got {:?}", events[0]);
    };
    assert!((update.scale - 1.5).abs() < 0.001);
    assert_eq!(update.center, Point::new(150.0, 100.0));
}

#[test]
fn test_pinch_from_staggered_contacts() {
    let mut engine = GestureEngine::new();
    let mut events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            pair(TouchPhase::Start, (0.0, 0.0), (0.0, 100.0), 30),
            pair(TouchPhase::Move, (0.0, 0.0), (0.0, 50.0), 60),
            TouchInput::new(TouchPhase::End, vec![TouchSample::new(0.0, 50.0, 90)], 1),
            TouchInput::end(0.0, 0.0, 120),
        ],
    );
    events.extend(engine.advance_to(5_000));

    let kinds: Vec<_> = events.iter().map(GestureEvent::kind).collect();
    assert_eq!(kinds, vec![GestureKind::Pinch]);
    assert!(engine.pinch_state().is_none());
}

#[test]
fn test_pan_then_second_finger_still_ends_pan() {
    let mut engine = GestureEngine::new();
    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(40.0, 0.0, 20),
            pair(TouchPhase::Start, (40.0, 0.0), (140.0, 0.0), 30),
            TouchInput::new(TouchPhase::End, vec![TouchSample::new(140.0, 0.0, 60)], 1),
            TouchInput::moved(200.0, 0.0, 70),
            TouchInput::end(260.0, 0.0, 80),
        ],
    );

    assert_eq!(count(&events, GestureKind::PanStart), 1);
    assert_eq!(count(&events, GestureKind::PanEnd), 1);
    assert_eq!(count(&events, GestureKind::Swipe), 0);
}

// =============================================================================
// Timers
// =============================================================================

#[test]
fn test_timer_cancel_is_idempotent() {
    let mut timers = TimerQueue::new();
    let handle = timers.schedule(500, "long press");
    assert!(timers.cancel(handle));
    assert!(!timers.cancel(handle));
    assert!(timers.pop_due(1_000).is_none());

    let fired = timers.schedule(10, "tap");
    assert_eq!(timers.pop_due(10).map(|(h, _, a)| (h, a)), Some((fired, "tap")));
    assert!(!timers.cancel(fired));
}

#[test]
fn test_repeated_advance_does_not_duplicate_long_press() {
    let mut engine = GestureEngine::new();
    engine.process(&TouchInput::start(0.0, 0.0, 0));
    let mut events = Vec::new();
    for now in [500, 500, 501, 900] {
        events.extend(engine.advance_to(now));
    }
    events.extend(engine.process(&TouchInput::end(0.0, 0.0, 950)));
    assert_eq!(count(&events, GestureKind::LongPress), 1);
}

// =============================================================================
// Listeners and Haptics
// =============================================================================

#[test]
fn test_panicking_listener_does_not_stop_siblings() {
    let taps = Arc::new(Mutex::new(Vec::new()));
    let mut engine = GestureEngine::new();
    engine.on_double_tap(|_| panic!("handler bug"));
    let sink = Arc::clone(&taps);
    engine.on_double_tap(move |p| sink.lock().unwrap().push(p));

    for base in [0, 1_000] {
        run(
            &mut engine,
            &[
                TouchInput::start(1.0, 1.0, base),
                TouchInput::end(1.0, 1.0, base + 40),
                TouchInput::start(1.0, 1.0, base + 100),
                TouchInput::end(1.0, 1.0, base + 140),
            ],
        );
    }

    assert_eq!(taps.lock().unwrap().len(), 2);
}

#[test]
fn test_remove_listener_stops_delivery() {
    let hits = Arc::new(Mutex::new(0));
    let mut engine = GestureEngine::new();
    let counter = Arc::clone(&hits);
    let id = engine.on_pan_move(move |_, _| *counter.lock().unwrap() += 1);
    assert_eq!(engine.listener_count(GestureKind::PanMove), 1);
    assert!(engine.remove_listener(id));
    assert!(!engine.remove_listener(id));

    run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(50.0, 0.0, 20),
        ],
    );
    assert_eq!(*hits.lock().unwrap(), 0);
}

#[test]
fn test_haptics_follow_gestures() {
    let device = SharedHaptics::default();
    let mut engine = GestureEngine::new();
    engine.set_haptic_device(Box::new(device.clone()));

    run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(60.0, 0.0, 30),
            TouchInput::end(120.0, 0.0, 60),
            TouchInput::start(0.0, 0.0, 1_000),
            TouchInput::end(0.0, 0.0, 1_050),
        ],
    );
    engine.advance_to(2_000);

    assert_eq!(
        *device.0.lock().unwrap(),
        vec![HapticIntensity::Impact, HapticIntensity::Selection]
    );
}

#[test]
fn test_haptics_disabled_by_config() {
    let device = SharedHaptics::default();
    let mut engine = GestureEngine::with_config(GestureConfig::default().with_haptics(false));
    engine.set_haptic_device(Box::new(device.clone()));

    run(
        &mut engine,
        &[TouchInput::start(0.0, 0.0, 0), TouchInput::end(0.0, 0.0, 50)],
    );
    engine.advance_to(2_000);
    assert!(device.0.lock().unwrap().is_empty());
}

#[test]
fn test_failing_haptics_never_block_gestures() {
    let mut engine = GestureEngine::new();
    engine.set_haptic_device(Box::new(BrokenHaptics));

    run(
        &mut engine,
        &[TouchInput::start(0.0, 0.0, 0), TouchInput::end(0.0, 0.0, 50)],
    );
    let events = engine.advance_to(2_000);
    assert_eq!(count(&events, GestureKind::Tap), 1);
    assert_eq!(engine.haptic_failures(), 1);
    assert!(!engine.trigger_haptic(HapticIntensity::Notification));
    assert_eq!(engine.haptic_failures(), 2);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_custom_thresholds_change_recognition() {
    let config = GestureConfig::default()
        .with_swipe_distance_threshold(150.0)
        .with_long_press_delay_ms(200);
    let mut engine = GestureEngine::with_config(config);

    let events = run(
        &mut engine,
        &[
            TouchInput::start(0.0, 0.0, 0),
            TouchInput::moved(60.0, 0.0, 30),
            TouchInput::end(120.0, 0.0, 60),
        ],
    );
    assert_eq!(count(&events, GestureKind::Swipe), 0);

    engine.process(&TouchInput::start(0.0, 0.0, 1_000));
    assert_eq!(count(&engine.advance_to(1_200), GestureKind::LongPress), 1);
}

// =============================================================================
// Properties
// =============================================================================

fn single_finger_session() -> impl Strategy<Value = (Vec<(f32, f32, u64)>, bool)> {
    (
        prop::collection::vec((-300.0f32..300.0, -300.0f32..300.0, 1u64..400), 0..10),
        any::<bool>(),
    )
}

fn session_trace(moves: &[(f32, f32, u64)], cancel: bool, start_ms: u64) -> Vec<TouchInput> {
    let mut t = start_ms;
    let mut trace = vec![TouchInput::start(0.0, 0.0, t)];
    let mut last = (0.0, 0.0);
    for &(x, y, dt) in moves {
        t += dt;
        last = (x, y);
        trace.push(TouchInput::moved(x, y, t));
    }
    t += 1;
    if cancel {
        trace.push(TouchInput::cancel(last.0, last.1, t));
    } else {
        trace.push(TouchInput::end(last.0, last.1, t));
    }
    trace
}

proptest! {
    #[test]
    fn prop_at_most_one_discrete_gesture_per_session((moves, cancel) in single_finger_session()) {
        let mut engine = GestureEngine::new();
        let mut events = run(&mut engine, &session_trace(&moves, cancel, 0));
        events.extend(engine.advance_to(u64::MAX / 2));

        let discrete = events.iter().filter(|e| e.kind().is_discrete()).count();
        prop_assert!(discrete <= 1, "events: {:?}", events);
        prop_assert_eq!(
            count(&events, GestureKind::PanStart),
            count(&events, GestureKind::PanEnd)
        );
        prop_assert!(count(&events, GestureKind::PanStart) <= 1);
        prop_assert!(!engine.is_pressed());
        prop_assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn prop_two_sessions_emit_at_most_two_discrete(
        (first, cancel_first) in single_finger_session(),
        (second, cancel_second) in single_finger_session(),
        gap in 1u64..600,
    ) {
        let mut engine = GestureEngine::new();
        let trace = session_trace(&first, cancel_first, 0);
        let first_end = trace.last().and_then(TouchInput::timestamp_ms).unwrap_or(0);
        let mut events = run(&mut engine, &trace);
        events.extend(run(&mut engine, &session_trace(&second, cancel_second, first_end + gap)));
        events.extend(engine.advance_to(u64::MAX / 2));

        let discrete = events.iter().filter(|e| e.kind().is_discrete()).count();
        prop_assert!(discrete <= 2);
        let double_taps = count(&events, GestureKind::DoubleTap);
        prop_assert!(double_taps <= 1);
        if double_taps == 1 {
            prop_assert_eq!(count(&events, GestureKind::Tap), 0);
        }
    }
}
