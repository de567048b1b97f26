//! Single-finger recognition: tap, double-tap, long-press and pan.
//!
//! The classifier is driven by the engine with the open [`SessionState`],
//! the engine's [`TimerQueue`] and an output buffer. It owns the only state
//! that outlives a session: the last tap candidate and the pending tap
//! confirmations.

use crate::config::GestureConfig;
use crate::event::GestureEvent;
use crate::geometry::Point;
use crate::session::{SessionState, SingleFingerPhase};
use crate::swipe::SwipeResolver;
use crate::timer::{TimerHandle, TimerQueue};
use crate::timing::{self, TouchSample};

/// Deferred work scheduled by the recognizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureTimer {
    /// Long-press deadline of a session.
    LongPress {
        /// Session the timer belongs to.
        session: u64,
    },
    /// Delayed single-tap confirmation.
    TapConfirm {
        /// Where the tapping finger lifted.
        position: Point,
    },
}

/// The tap a following tap may pair with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TapCandidate {
    ended_ms: u64,
    confirm: TimerHandle,
}

/// Discriminates tap, double-tap, long-press and pan for one contact.
#[derive(Debug, Clone)]
pub struct SingleFingerClassifier {
    pan_activation_distance: f32,
    long_press_delay_ms: u64,
    double_tap_window_ms: u64,
    tap_confirm_delay_ms: u64,
    swipe: SwipeResolver,
    /// Set only while the most recent session was a tap. Any other
    /// session, and a double tap, clear it.
    last_tap: Option<TapCandidate>,
    /// Unconfirmed single taps, oldest first.
    pending_taps: Vec<TimerHandle>,
}

impl SingleFingerClassifier {
    /// Create a classifier from the engine configuration.
    pub const fn new(config: &GestureConfig) -> Self {
        Self {
            pan_activation_distance: config.pan_activation_distance,
            long_press_delay_ms: config.long_press_delay_ms,
            double_tap_window_ms: config.double_tap_window_ms,
            tap_confirm_delay_ms: config.tap_confirm_delay_ms,
            swipe: SwipeResolver::new(
                config.swipe_distance_threshold,
                config.swipe_velocity_threshold,
            ),
            last_tap: None,
            pending_taps: Vec::new(),
        }
    }

    /// End time of the last tap candidate still eligible for a double tap.
    pub fn last_tap_ms(&self) -> Option<u64> {
        self.last_tap.map(|tap| tap.ended_ms)
    }

    /// Whether a single tap is waiting for confirmation.
    pub fn has_pending_tap(&self) -> bool {
        !self.pending_taps.is_empty()
    }

    /// Forget the previous tap and drop every pending confirmation.
    pub fn reset_tap_history(&mut self, timers: &mut TimerQueue<GestureTimer>) {
        self.last_tap = None;
        for handle in self.pending_taps.drain(..) {
            timers.cancel(handle);
        }
    }

    /// A new session began with one contact: arm the long-press timer.
    pub fn on_start(&self, session: &mut SessionState, timers: &mut TimerQueue<GestureTimer>) {
        session.phase = SingleFingerPhase::Pressed;
        let deadline = session
            .start_point
            .timestamp_ms
            .saturating_add(self.long_press_delay_ms);
        session.long_press_timer = Some(timers.schedule(
            deadline,
            GestureTimer::LongPress {
                session: session.id,
            },
        ));
    }

    /// The only contact moved.
    pub fn on_move(
        &self,
        session: &mut SessionState,
        sample: TouchSample,
        timers: &mut TimerQueue<GestureTimer>,
        out: &mut Vec<GestureEvent>,
    ) {
        match session.phase {
            SingleFingerPhase::Pressed => {
                let moved = timing::distance(&session.start_point, &sample);
                if moved >= self.pan_activation_distance {
                    session.cancel_long_press(timers);
                    session.is_panning = true;
                    session.phase = SingleFingerPhase::Panning;
                    out.push(GestureEvent::PanStart {
                        position: session.start_point.position,
                    });
                    out.push(GestureEvent::PanMove {
                        position: sample.position,
                        delta: sample.position - session.start_point.position,
                    });
                }
            }
            SingleFingerPhase::Panning => {
                out.push(GestureEvent::PanMove {
                    position: sample.position,
                    delta: sample.position - session.last_point.position,
                });
            }
            SingleFingerPhase::Idle
            | SingleFingerPhase::LongPressed
            | SingleFingerPhase::MultiTouch => {}
        }
        session.last_point = sample;
    }

    /// The long-press timer of `session` fired.
    pub fn on_long_press(
        &self,
        session: &mut SessionState,
        handle: TimerHandle,
        out: &mut Vec<GestureEvent>,
    ) {
        if session.long_press_timer != Some(handle) || session.phase != SingleFingerPhase::Pressed
        {
            return;
        }
        session.long_press_timer = None;
        session.phase = SingleFingerPhase::LongPressed;
        out.push(GestureEvent::LongPress {
            position: session.last_point.position,
        });
    }

    /// A second contact joined: single-finger recognition stops.
    pub fn on_second_contact(
        &self,
        session: &mut SessionState,
        timers: &mut TimerQueue<GestureTimer>,
    ) {
        session.cancel_long_press(timers);
        session.phase = SingleFingerPhase::MultiTouch;
    }

    /// The last contact lifted at `end`.
    pub fn on_end(
        &mut self,
        session: &mut SessionState,
        end: TouchSample,
        timers: &mut TimerQueue<GestureTimer>,
        out: &mut Vec<GestureEvent>,
    ) {
        session.cancel_long_press(timers);
        session.last_point = end;

        if session.phase != SingleFingerPhase::Pressed {
            self.last_tap = None;
        }
        match session.phase {
            SingleFingerPhase::Pressed => self.resolve_tap(end, timers, out),
            SingleFingerPhase::Panning => {
                out.push(GestureEvent::PanEnd {
                    position: end.position,
                });
                if let Some(swipe) = self.swipe.resolve(&session.start_point, &end) {
                    out.push(GestureEvent::Swipe(swipe));
                }
            }
            SingleFingerPhase::MultiTouch if session.is_panning => {
                out.push(GestureEvent::PanEnd {
                    position: end.position,
                });
            }
            SingleFingerPhase::MultiTouch
            | SingleFingerPhase::LongPressed
            | SingleFingerPhase::Idle => {}
        }
        session.phase = SingleFingerPhase::Idle;
    }

    /// The platform cancelled the last contact. No discrete gesture fires.
    pub fn on_cancel(
        &mut self,
        session: &mut SessionState,
        end: TouchSample,
        timers: &mut TimerQueue<GestureTimer>,
        out: &mut Vec<GestureEvent>,
    ) {
        session.cancel_long_press(timers);
        session.last_point = end;
        self.last_tap = None;
        let pan_open = matches!(
            session.phase,
            SingleFingerPhase::Panning | SingleFingerPhase::MultiTouch
        );
        if pan_open && session.is_panning {
            out.push(GestureEvent::PanEnd {
                position: end.position,
            });
        }
        session.phase = SingleFingerPhase::Idle;
    }

    /// A tap confirmation timer fired.
    pub fn on_tap_confirm(
        &mut self,
        handle: TimerHandle,
        position: Point,
        out: &mut Vec<GestureEvent>,
    ) {
        let Some(index) = self.pending_taps.iter().position(|h| *h == handle) else {
            return;
        };
        self.pending_taps.remove(index);
        out.push(GestureEvent::Tap { position });
    }

    /// Delay from lift to tap confirmation. A tap is never confirmed while
    /// a second tap could still complete a double tap.
    pub const fn confirm_delay_ms(&self) -> u64 {
        if self.tap_confirm_delay_ms > self.double_tap_window_ms {
            self.tap_confirm_delay_ms
        } else {
            self.double_tap_window_ms
        }
    }

    fn resolve_tap(
        &mut self,
        end: TouchSample,
        timers: &mut TimerQueue<GestureTimer>,
        out: &mut Vec<GestureEvent>,
    ) {
        let now = end.timestamp_ms;
        let paired = self
            .last_tap
            .take()
            .filter(|tap| now.saturating_sub(tap.ended_ms) < self.double_tap_window_ms);

        if let Some(first) = paired {
            timers.cancel(first.confirm);
            self.pending_taps.retain(|h| *h != first.confirm);
            out.push(GestureEvent::DoubleTap {
                position: end.position,
            });
            return;
        }

        let confirm = timers.schedule(
            now.saturating_add(self.confirm_delay_ms()),
            GestureTimer::TapConfirm {
                position: end.position,
            },
        );
        self.pending_taps.push(confirm);
        self.last_tap = Some(TapCandidate {
            ended_ms: now,
            confirm,
        });
    }
}
