//! Scripted gesture sessions against a virtual clock.

use serde::{Deserialize, Serialize};
use touchkit_core::{
    GestureConfig, GestureEngine, GestureEvent, GestureKind, Point, TouchInput, TouchPhase,
    TouchSample,
};

/// Time between press and lift in [`GestureHarness::tap`].
const TAP_HOLD_MS: u64 = 40;
/// Pause between the two taps of [`GestureHarness::double_tap`].
const DOUBLE_TAP_GAP_MS: u64 = 80;

/// A gesture with the virtual time it was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedGesture {
    /// Virtual time in milliseconds.
    pub at_ms: u64,
    /// The gesture.
    pub event: GestureEvent,
}

/// Test harness driving a [`GestureEngine`] with scripted contacts.
///
/// Every helper returns `&mut Self` so sessions read as a script:
///
/// ```
/// use touchkit_core::GestureKind;
/// use touchkit_test::GestureHarness;
///
/// let mut harness = GestureHarness::new();
/// harness.touch_down(0.0, 0.0).wait(20).move_to(80.0, 0.0).wait(20).lift();
/// assert_eq!(harness.count(GestureKind::Swipe), 1);
/// ```
#[derive(Debug)]
pub struct GestureHarness {
    engine: GestureEngine,
    /// Virtual clock in milliseconds.
    now_ms: u64,
    /// Positions of the contacts currently down, in landing order.
    contacts: Vec<Point>,
    events: Vec<TimedGesture>,
}

impl GestureHarness {
    /// Create a harness with the default configuration.
    pub fn new() -> Self {
        Self::with_engine(GestureEngine::new())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: GestureConfig) -> Self {
        Self::with_engine(GestureEngine::with_config(config))
    }

    /// Wrap an existing engine, e.g. one built by an adapter.
    pub fn with_engine(engine: GestureEngine) -> Self {
        Self {
            engine,
            now_ms: 0,
            contacts: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The engine under test.
    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    /// Mutable access, for registering listeners or haptic devices.
    pub fn engine_mut(&mut self) -> &mut GestureEngine {
        &mut self.engine
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Contacts currently down.
    pub fn contacts(&self) -> &[Point] {
        &self.contacts
    }

    // === Contacts ===

    /// Put a new finger down at `(x, y)`.
    pub fn touch_down(&mut self, x: f32, y: f32) -> &mut Self {
        self.contacts.push(Point::new(x, y));
        let samples = self.samples();
        self.send(TouchPhase::Start, samples, self.contacts.len())
    }

    /// Move the first finger to `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        if let Some(first) = self.contacts.first_mut() {
            *first = Point::new(x, y);
        }
        let samples = self.samples();
        self.send(TouchPhase::Move, samples, self.contacts.len())
    }

    /// Move every finger at once. Extra positions are ignored.
    pub fn move_contacts(&mut self, positions: &[(f32, f32)]) -> &mut Self {
        for (contact, &(x, y)) in self.contacts.iter_mut().zip(positions) {
            *contact = Point::new(x, y);
        }
        let samples = self.samples();
        self.send(TouchPhase::Move, samples, self.contacts.len())
    }

    /// Lift the most recently placed finger.
    pub fn lift(&mut self) -> &mut Self {
        let Some(position) = self.contacts.pop() else {
            return self;
        };
        let sample = TouchSample::at(position, self.now_ms);
        self.send(TouchPhase::End, vec![sample], self.contacts.len())
    }

    /// The platform cancels every finger.
    pub fn cancel(&mut self) -> &mut Self {
        let samples = self.samples();
        self.contacts.clear();
        self.send(TouchPhase::Cancel, samples, 0)
    }

    /// Advance the clock and fire due timers. Each timer's gestures are
    /// stamped with its own deadline.
    pub fn wait(&mut self, ms: u64) -> &mut Self {
        let target = self.now_ms.saturating_add(ms);
        self.flush_until(target);
        self.now_ms = target;
        let emitted = self.engine.advance_to(target);
        self.record(emitted);
        self
    }

    /// Advance past every delay the engine may have scheduled.
    pub fn settle(&mut self) -> &mut Self {
        let delay = self.engine.config().max_delay_ms();
        self.wait(delay + 1)
    }

    /// Deliver a raw frame, moving the clock to its timestamp.
    pub fn process(&mut self, input: &TouchInput) -> &mut Self {
        if let Some(t) = input.timestamp_ms() {
            self.flush_until(t);
            self.now_ms = self.now_ms.max(t);
        }
        let emitted = self.engine.process(input);
        self.record(emitted);
        self
    }

    /// Deliver a YAML list of frames.
    pub fn replay_yaml(&mut self, source: &str) -> Result<&mut Self, serde_yaml_ng::Error> {
        let trace: Vec<TouchInput> = serde_yaml_ng::from_str(source)?;
        for input in &trace {
            self.process(input);
        }
        Ok(self)
    }

    // === Composite gestures ===

    /// Press and lift in place.
    pub fn tap(&mut self, x: f32, y: f32) -> &mut Self {
        self.touch_down(x, y).wait(TAP_HOLD_MS).lift()
    }

    /// Two taps in quick succession.
    pub fn double_tap(&mut self, x: f32, y: f32) -> &mut Self {
        self.tap(x, y).wait(DOUBLE_TAP_GAP_MS).tap(x, y)
    }

    /// Hold still for `hold_ms`, then lift.
    pub fn long_press(&mut self, x: f32, y: f32, hold_ms: u64) -> &mut Self {
        self.touch_down(x, y).wait(hold_ms).lift()
    }

    /// One-finger drag in `steps` evenly spaced moves over `duration_ms`.
    pub fn drag(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        duration_ms: u64,
        steps: u32,
    ) -> &mut Self {
        let steps = steps.max(1);
        let step_ms = duration_ms / u64::from(steps);
        self.touch_down(from.0, from.1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.wait(step_ms);
            self.move_to(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        let remainder = duration_ms - step_ms * u64::from(steps);
        self.wait(remainder).lift()
    }

    /// Two fingers on a horizontal line through `center`, spreading from
    /// `from_distance` to `to_distance` apart, then lifting.
    pub fn pinch(
        &mut self,
        center: (f32, f32),
        from_distance: f32,
        to_distance: f32,
        duration_ms: u64,
        steps: u32,
    ) -> &mut Self {
        let steps = steps.max(1);
        let step_ms = duration_ms / u64::from(steps);
        let half = from_distance / 2.0;
        self.touch_down(center.0 - half, center.1);
        self.touch_down(center.0 + half, center.1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let half = (from_distance + (to_distance - from_distance) * t) / 2.0;
            self.wait(step_ms);
            self.move_contacts(&[(center.0 - half, center.1), (center.0 + half, center.1)]);
        }
        self.lift().lift()
    }

    // === Results ===

    /// Every gesture emitted so far.
    pub fn events(&self) -> Vec<GestureEvent> {
        self.events.iter().map(|timed| timed.event).collect()
    }

    /// Every gesture with its emission time.
    pub fn timed_events(&self) -> &[TimedGesture] {
        &self.events
    }

    /// Kinds of every gesture emitted so far.
    pub fn kinds(&self) -> Vec<GestureKind> {
        self.events.iter().map(|timed| timed.event.kind()).collect()
    }

    /// Gestures of `kind` emitted so far.
    pub fn count(&self, kind: GestureKind) -> usize {
        self.events
            .iter()
            .filter(|timed| timed.event.kind() == kind)
            .count()
    }

    /// Forget recorded gestures. Engine state is untouched.
    pub fn clear_events(&mut self) -> &mut Self {
        self.events.clear();
        self
    }

    // === Assertions ===

    /// Assert the exact sequence of emitted kinds.
    ///
    /// # Panics
    ///
    /// Panics if the sequence differs.
    pub fn assert_kinds(&self, expected: &[GestureKind]) -> &Self {
        let actual = self.kinds();
        assert_eq!(
            actual, expected,
            "Expected gestures {expected:?} but got {actual:?}"
        );
        self
    }

    /// Assert how many gestures of `kind` were emitted.
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    pub fn assert_count(&self, kind: GestureKind, expected: usize) -> &Self {
        let actual = self.count(kind);
        assert_eq!(
            actual, expected,
            "Expected {expected} '{kind}' gestures but found {actual}"
        );
        self
    }

    // === Internal ===

    fn samples(&self) -> Vec<TouchSample> {
        self.contacts
            .iter()
            .map(|&p| TouchSample::at(p, self.now_ms))
            .collect()
    }

    fn send(&mut self, phase: TouchPhase, samples: Vec<TouchSample>, count: usize) -> &mut Self {
        let emitted = self.engine.process(&TouchInput::new(phase, samples, count));
        self.record(emitted);
        self
    }

    /// Fire timers one deadline at a time up to `until_ms`.
    fn flush_until(&mut self, until_ms: u64) {
        while let Some(deadline) = self.engine.next_deadline() {
            if deadline > until_ms {
                break;
            }
            self.now_ms = self.now_ms.max(deadline);
            let emitted = self.engine.advance_to(deadline);
            self.record(emitted);
        }
    }

    fn record(&mut self, emitted: Vec<GestureEvent>) {
        let at_ms = self.now_ms;
        self.events
            .extend(emitted.into_iter().map(|event| TimedGesture { at_ms, event }));
    }
}
