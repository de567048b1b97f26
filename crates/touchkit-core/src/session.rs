//! State of one touch interaction, from first contact down to last contact up.

use crate::timer::{TimerHandle, TimerQueue};
use crate::timing::TouchSample;

/// Where the single-finger state machine stands within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleFingerPhase {
    /// No session.
    #[default]
    Idle,
    /// Finger down, long-press timer armed, no pan yet.
    Pressed,
    /// Movement crossed the activation distance.
    Panning,
    /// Long press fired; the session emits nothing further.
    LongPressed,
    /// A second contact landed; single-finger recognition is over.
    MultiTouch,
}

/// The mutable record of an in-progress interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Session sequence number within the engine.
    pub id: u64,
    /// First contact of the session.
    pub start_point: TouchSample,
    /// Most recent contact sample.
    pub last_point: TouchSample,
    /// Contacts currently down.
    pub active_contacts: usize,
    /// Movement crossed the pan activation distance. Never reset.
    pub is_panning: bool,
    /// Armed long-press timer.
    pub long_press_timer: Option<TimerHandle>,
    /// Single-finger state.
    pub phase: SingleFingerPhase,
}

impl SessionState {
    /// Open a session at `start`.
    pub const fn new(id: u64, start: TouchSample, active_contacts: usize) -> Self {
        Self {
            id,
            start_point: start,
            last_point: start,
            active_contacts,
            is_panning: false,
            long_press_timer: None,
            phase: SingleFingerPhase::Pressed,
        }
    }

    /// Cancel the long-press timer if one is armed. Safe to call repeatedly.
    pub fn cancel_long_press<A>(&mut self, timers: &mut TimerQueue<A>) {
        if let Some(handle) = self.long_press_timer.take() {
            timers.cancel(handle);
        }
    }

    /// Whether a second contact ever joined this session.
    pub fn is_multi_touch(&self) -> bool {
        self.phase == SingleFingerPhase::MultiTouch
    }
}
