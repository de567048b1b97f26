//! The gesture engine: session tracking, classifier routing and dispatch.
//!
//! The engine is a synchronous state machine. Time only moves when the host
//! delivers a frame or calls [`GestureEngine::advance_to`], so the same
//! input always yields the same gestures.
//!
//! # Example
//!
//! ```
//! use touchkit_core::{GestureEngine, GestureEvent, TouchInput};
//!
//! let mut engine = GestureEngine::new();
//! engine.process(&TouchInput::start(0.0, 0.0, 0));
//! engine.process(&TouchInput::moved(60.0, 0.0, 40));
//! let events = engine.process(&TouchInput::end(100.0, 0.0, 100));
//!
//! assert!(events.iter().any(|e| matches!(e, GestureEvent::Swipe(_))));
//! ```

use std::borrow::Cow;

use crate::config::GestureConfig;
use crate::event::{GestureEvent, GestureKind, PinchData, SwipeData, TouchInput, TouchPhase};
use crate::geometry::Point;
use crate::haptics::{FeedbackEmitter, HapticDevice, HapticIntensity};
use crate::listener::{DispatchReport, ListenerId, ListenerRegistry};
use crate::pinch::{PinchClassifier, PinchState};
use crate::session::SessionState;
use crate::single::{GestureTimer, SingleFingerClassifier};
use crate::timer::{TimerHandle, TimerQueue};
use crate::timing::TouchSample;

/// Multi-touch gesture recognizer.
///
/// Feed it [`TouchInput`] frames with [`process`](Self::process) and fire
/// deferred gestures with [`advance_to`](Self::advance_to). Recognized
/// gestures are returned, sent to haptics and delivered to listeners.
///
/// Listeners run while the engine is borrowed; a listener must not call
/// back into the same engine.
#[derive(Debug)]
pub struct GestureEngine {
    config: GestureConfig,
    single: SingleFingerClassifier,
    pinch: PinchClassifier,
    session: Option<SessionState>,
    timers: TimerQueue<GestureTimer>,
    listeners: ListenerRegistry,
    feedback: FeedbackEmitter,
    next_session_id: u64,
    /// Latest time observed, in ms.
    clock_ms: u64,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            single: SingleFingerClassifier::new(&config),
            pinch: PinchClassifier::new(config.pinch_threshold),
            session: None,
            timers: TimerQueue::new(),
            listeners: ListenerRegistry::new(),
            feedback: FeedbackEmitter::new(config.enable_haptics),
            next_session_id: 0,
            clock_ms: 0,
            config,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Apply one input frame. Returns the gestures it produced, in order.
    pub fn process(&mut self, input: &TouchInput) -> Vec<GestureEvent> {
        self.on_sample_batch(input.phase, &input.samples, input.active_contacts)
    }

    /// Apply one batch of samples sharing a phase.
    ///
    /// Timers due at or before the batch timestamp fire first.
    pub fn on_sample_batch(
        &mut self,
        phase: TouchPhase,
        samples: &[TouchSample],
        active_contacts: usize,
    ) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        let samples = self.finite_samples(phase, samples);
        let samples = samples.as_ref();
        let Some(now) = samples.iter().map(|s| s.timestamp_ms).max() else {
            tracing::debug!(?phase, active_contacts, "ignoring frame without samples");
            return out;
        };

        self.fire_due(now, &mut out);
        self.clock_ms = self.clock_ms.max(now);
        tracing::trace!(
            ?phase,
            samples = samples.len(),
            active_contacts,
            now,
            "touch frame"
        );

        match phase {
            TouchPhase::Start => self.handle_start(samples, active_contacts),
            TouchPhase::Move => self.handle_move(samples, &mut out),
            TouchPhase::End => self.handle_lift(samples, active_contacts, false, &mut out),
            TouchPhase::Cancel => self.handle_lift(samples, active_contacts, true, &mut out),
        }

        self.emit(&out);
        out
    }

    /// Drop samples with a non-finite position. A lift keeps its timestamp
    /// and reuses the last known position so the session still closes.
    fn finite_samples<'a>(
        &self,
        phase: TouchPhase,
        samples: &'a [TouchSample],
    ) -> Cow<'a, [TouchSample]> {
        if samples.iter().all(|s| s.position.is_finite()) {
            return Cow::Borrowed(samples);
        }
        let fallback = match phase {
            TouchPhase::End | TouchPhase::Cancel => {
                self.session.as_ref().map(|s| s.last_point.position)
            }
            TouchPhase::Start | TouchPhase::Move => None,
        };
        let kept: Vec<TouchSample> = samples
            .iter()
            .filter_map(|s| {
                if s.position.is_finite() {
                    Some(*s)
                } else {
                    fallback.map(|position| TouchSample { position, ..*s })
                }
            })
            .collect();
        tracing::debug!(
            ?phase,
            dropped = samples.len() - kept.len(),
            "non-finite touch position"
        );
        Cow::Owned(kept)
    }

    /// Fire every timer due at or before `now_ms`.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.fire_due(now_ms, &mut out);
        self.clock_ms = self.clock_ms.max(now_ms);
        self.emit(&out);
        out
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Latest time observed through frames or [`advance_to`](Self::advance_to).
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    fn handle_start(&mut self, samples: &[TouchSample], active_contacts: usize) {
        let count = active_contacts.max(1);
        let first = samples[0];

        let Some(session) = self.session.as_mut() else {
            let mut session = SessionState::new(self.next_session_id, first, count);
            self.next_session_id += 1;
            self.single.on_start(&mut session, &mut self.timers);
            if count >= 2 {
                self.single.on_second_contact(&mut session, &mut self.timers);
                let second = samples.get(1).unwrap_or(&first);
                self.update_pinch_tracking(0, count, first.position, second.position);
            }
            tracing::debug!(session = session.id, contacts = count, "session opened");
            self.session = Some(session);
            return;
        };

        let previous = session.active_contacts;
        session.active_contacts = count;
        if previous < 2 && count >= 2 {
            self.single.on_second_contact(session, &mut self.timers);
        }
        let (a, b) = match samples {
            [a, b, ..] => (a.position, b.position),
            [a] => (session.last_point.position, a.position),
            [] => return,
        };
        self.update_pinch_tracking(previous, count, a, b);
    }

    /// Pinch runs while exactly two contacts are down and only restarts
    /// after the count has dropped below two.
    fn update_pinch_tracking(&mut self, previous: usize, count: usize, a: Point, b: Point) {
        if count > 2 {
            self.pinch.end();
        } else if previous < 2 && count == 2 {
            self.pinch.begin(a, b);
        }
    }

    fn handle_move(&mut self, samples: &[TouchSample], out: &mut Vec<GestureEvent>) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("ignoring move without an open session");
            return;
        };

        match (session.active_contacts, samples) {
            (1, [sample, ..]) => {
                self.single.on_move(session, *sample, &mut self.timers, out);
            }
            (2, [a, b, ..]) => {
                session.last_point = *a;
                if let Some(update) = self.pinch.update(a.position, b.position) {
                    out.push(GestureEvent::Pinch(update));
                }
            }
            (_, [sample, ..]) => session.last_point = *sample,
            (_, []) => {}
        }
    }

    fn handle_lift(
        &mut self,
        samples: &[TouchSample],
        active_contacts: usize,
        cancelled: bool,
        out: &mut Vec<GestureEvent>,
    ) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(cancelled, "ignoring lift without an open session");
            return;
        };

        session.active_contacts = active_contacts;
        if active_contacts < 2 {
            self.pinch.end();
        }
        if active_contacts > 0 {
            return;
        }

        let Some(mut session) = self.session.take() else {
            return;
        };
        let end = samples[0];
        if cancelled {
            self.single.on_cancel(&mut session, end, &mut self.timers, out);
        } else {
            self.single.on_end(&mut session, end, &mut self.timers, out);
        }
        tracing::debug!(session = session.id, cancelled, "session closed");
    }

    fn fire_due(&mut self, now_ms: u64, out: &mut Vec<GestureEvent>) {
        while let Some((handle, deadline, action)) = self.timers.pop_due(now_ms) {
            tracing::trace!(timer = handle.id(), deadline, ?action, "timer fired");
            match action {
                GestureTimer::LongPress { session } => self.fire_long_press(session, handle, out),
                GestureTimer::TapConfirm { position } => {
                    self.single.on_tap_confirm(handle, position, out);
                }
            }
        }
    }

    fn fire_long_press(&mut self, id: u64, handle: TimerHandle, out: &mut Vec<GestureEvent>) {
        if let Some(session) = self.session.as_mut().filter(|s| s.id == id) {
            self.single.on_long_press(session, handle, out);
        }
    }

    fn emit(&mut self, events: &[GestureEvent]) {
        for event in events {
            let kind = event.kind();
            tracing::debug!(%kind, position = ?event.position(), "gesture");
            self.feedback.confirm(kind);
            let DispatchReport { panicked, .. } = self.listeners.dispatch(event);
            if panicked > 0 {
                tracing::debug!(%kind, panicked, "listeners failed during dispatch");
            }
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Contacts currently down.
    pub fn touch_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.active_contacts)
    }

    /// Whether a session is open.
    pub const fn is_pressed(&self) -> bool {
        self.session.is_some()
    }

    /// The open session, if any.
    pub const fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Pinch tracking state while two contacts are down.
    pub const fn pinch_state(&self) -> Option<&PinchState> {
        self.pinch.state()
    }

    /// Whether a single tap is waiting for its confirmation delay.
    pub fn has_pending_tap(&self) -> bool {
        self.single.has_pending_tap()
    }

    /// Drop the open session, cancel every timer and forget tap history.
    pub fn reset(&mut self) {
        self.single.reset_tap_history(&mut self.timers);
        self.timers.clear();
        self.pinch.end();
        self.session = None;
    }

    /// Forget the previous tap so the next one cannot form a double tap.
    pub fn reset_tap_history(&mut self) {
        self.single.reset_tap_history(&mut self.timers);
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a handler for every event of `kind`.
    pub fn on<F>(&mut self, kind: GestureKind, handler: F) -> ListenerId
    where
        F: FnMut(&GestureEvent) + Send + 'static,
    {
        self.listeners.register(kind, Box::new(handler))
    }

    /// Unregister a handler. Returns `false` if it was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Handlers registered for `kind`.
    pub fn listener_count(&self, kind: GestureKind) -> usize {
        self.listeners.count(kind)
    }

    /// Called with the position of a confirmed single tap.
    pub fn on_tap<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point) + Send + 'static,
    {
        self.on(GestureKind::Tap, move |event| {
            if let GestureEvent::Tap { position } = event {
                handler(*position);
            }
        })
    }

    /// Called with the position of the second tap.
    pub fn on_double_tap<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point) + Send + 'static,
    {
        self.on(GestureKind::DoubleTap, move |event| {
            if let GestureEvent::DoubleTap { position } = event {
                handler(*position);
            }
        })
    }

    /// Called with the finger position when the long-press delay elapses.
    pub fn on_long_press<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point) + Send + 'static,
    {
        self.on(GestureKind::LongPress, move |event| {
            if let GestureEvent::LongPress { position } = event {
                handler(*position);
            }
        })
    }

    /// Called with the session start point when a pan activates.
    pub fn on_pan_start<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point) + Send + 'static,
    {
        self.on(GestureKind::PanStart, move |event| {
            if let GestureEvent::PanStart { position } = event {
                handler(*position);
            }
        })
    }

    /// Called with `(position, delta)` for every pan move.
    pub fn on_pan_move<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point, Point) + Send + 'static,
    {
        self.on(GestureKind::PanMove, move |event| {
            if let GestureEvent::PanMove { position, delta } = event {
                handler(*position, *delta);
            }
        })
    }

    /// Called with the lift position when a pan ends.
    pub fn on_pan_end<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(Point) + Send + 'static,
    {
        self.on(GestureKind::PanEnd, move |event| {
            if let GestureEvent::PanEnd { position } = event {
                handler(*position);
            }
        })
    }

    /// Called for every recognized swipe.
    pub fn on_swipe<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(SwipeData) + Send + 'static,
    {
        self.on(GestureKind::Swipe, move |event| {
            if let GestureEvent::Swipe(data) = event {
                handler(*data);
            }
        })
    }

    /// Called for every pinch update.
    pub fn on_pinch<F>(&mut self, mut handler: F) -> ListenerId
    where
        F: FnMut(PinchData) + Send + 'static,
    {
        self.on(GestureKind::Pinch, move |event| {
            if let GestureEvent::Pinch(data) = event {
                handler(*data);
            }
        })
    }

    // =========================================================================
    // Haptics
    // =========================================================================

    /// Attach the device confirmations are sent to.
    pub fn set_haptic_device(&mut self, device: Box<dyn HapticDevice>) {
        self.feedback.set_device(device);
    }

    /// Enable or disable gesture confirmations at runtime.
    pub fn set_haptics_enabled(&mut self, enabled: bool) {
        self.config.enable_haptics = enabled;
        self.feedback.set_enabled(enabled);
    }

    /// Send feedback outside of gesture recognition.
    ///
    /// Returns whether the device accepted it. Never fails.
    pub fn trigger_haptic(&mut self, intensity: HapticIntensity) -> bool {
        self.feedback.trigger(intensity)
    }

    /// Device failures swallowed so far.
    pub const fn haptic_failures(&self) -> u64 {
        self.feedback.failures()
    }
}
