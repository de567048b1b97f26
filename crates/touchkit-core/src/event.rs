//! Input frames consumed by the engine and gesture events it emits.

use crate::geometry::Point;
use crate::timing::TouchSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase tag of an input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// One or more contacts went down.
    Start,
    /// Active contacts moved.
    Move,
    /// One or more contacts lifted.
    End,
    /// The platform aborted the contacts (e.g. palm rejection).
    Cancel,
}

/// One frame delivered by the input source.
///
/// For `Start`/`Move` the samples are the currently active contacts. For
/// `End`/`Cancel` they are the contacts that just lifted.
/// `active_contacts` is the number of contacts still down after the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    /// Phase tag.
    pub phase: TouchPhase,
    /// Contact samples carried by the frame.
    pub samples: Vec<TouchSample>,
    /// Contacts down after this frame.
    pub active_contacts: usize,
}

impl TouchInput {
    /// Create a frame.
    pub fn new(phase: TouchPhase, samples: Vec<TouchSample>, active_contacts: usize) -> Self {
        Self {
            phase,
            samples,
            active_contacts,
        }
    }

    /// Single finger down at `(x, y)`.
    pub fn start(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(
            TouchPhase::Start,
            vec![TouchSample::new(x, y, timestamp_ms)],
            1,
        )
    }

    /// Single finger moved to `(x, y)`.
    pub fn moved(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(
            TouchPhase::Move,
            vec![TouchSample::new(x, y, timestamp_ms)],
            1,
        )
    }

    /// Last finger lifted at `(x, y)`.
    pub fn end(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(
            TouchPhase::End,
            vec![TouchSample::new(x, y, timestamp_ms)],
            0,
        )
    }

    /// Last finger cancelled at `(x, y)`.
    pub fn cancel(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(
            TouchPhase::Cancel,
            vec![TouchSample::new(x, y, timestamp_ms)],
            0,
        )
    }

    /// Timestamp of the frame: the latest sample timestamp.
    pub fn timestamp_ms(&self) -> Option<u64> {
        self.samples.iter().map(|s| s.timestamp_ms).max()
    }
}

/// Axis-and-sign of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    /// Negative x
    Left,
    /// Positive x
    Right,
    /// Negative y
    Up,
    /// Positive y
    Down,
}

impl SwipeDirection {
    /// Whether the swipe runs along the x axis.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(name)
    }
}

/// Parameters of a recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeData {
    /// Direction of travel.
    pub direction: SwipeDirection,
    /// End-to-end distance in pixels.
    pub distance: f32,
    /// Average velocity in px/ms.
    pub velocity: f32,
    /// Duration of the pan in milliseconds.
    pub duration_ms: u64,
}

/// Parameters of a pinch update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchData {
    /// Current distance over the initial distance.
    pub scale: f32,
    /// Midpoint of the two contacts.
    pub center: Point,
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Confirmed single tap.
    Tap {
        /// Where the finger lifted.
        position: Point,
    },
    /// Second tap within the double-tap window.
    DoubleTap {
        /// Where the second finger lifted.
        position: Point,
    },
    /// Stationary hold past the long-press delay.
    LongPress {
        /// Position at the time the hold fired.
        position: Point,
    },
    /// Movement crossed the pan activation distance.
    PanStart {
        /// Where the session started.
        position: Point,
    },
    /// Pan movement.
    PanMove {
        /// Current position.
        position: Point,
        /// Movement since the previous sample. The first move after
        /// activation is measured from the session start point, so it
        /// includes the distance travelled before the pan began.
        delta: Point,
    },
    /// The panning finger lifted.
    PanEnd {
        /// Final position.
        position: Point,
    },
    /// Fast, long pan.
    Swipe(SwipeData),
    /// Two-finger scale change.
    Pinch(PinchData),
}

impl GestureEvent {
    /// Discriminant of this event.
    pub const fn kind(&self) -> GestureKind {
        match self {
            Self::Tap { .. } => GestureKind::Tap,
            Self::DoubleTap { .. } => GestureKind::DoubleTap,
            Self::LongPress { .. } => GestureKind::LongPress,
            Self::PanStart { .. } => GestureKind::PanStart,
            Self::PanMove { .. } => GestureKind::PanMove,
            Self::PanEnd { .. } => GestureKind::PanEnd,
            Self::Swipe(_) => GestureKind::Swipe,
            Self::Pinch(_) => GestureKind::Pinch,
        }
    }

    /// Reference position of the event.
    pub const fn position(&self) -> Point {
        match self {
            Self::Tap { position }
            | Self::DoubleTap { position }
            | Self::LongPress { position }
            | Self::PanStart { position }
            | Self::PanMove { position, .. }
            | Self::PanEnd { position } => *position,
            Self::Swipe(_) => Point::ORIGIN,
            Self::Pinch(data) => data.center,
        }
    }
}

/// Field-less gesture discriminant, used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// [`GestureEvent::Tap`]
    Tap,
    /// [`GestureEvent::DoubleTap`]
    DoubleTap,
    /// [`GestureEvent::LongPress`]
    LongPress,
    /// [`GestureEvent::PanStart`]
    PanStart,
    /// [`GestureEvent::PanMove`]
    PanMove,
    /// [`GestureEvent::PanEnd`]
    PanEnd,
    /// [`GestureEvent::Swipe`]
    Swipe,
    /// [`GestureEvent::Pinch`]
    Pinch,
}

impl GestureKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Tap,
        Self::DoubleTap,
        Self::LongPress,
        Self::PanStart,
        Self::PanMove,
        Self::PanEnd,
        Self::Swipe,
        Self::Pinch,
    ];

    /// Discrete kinds fire at most once per session and exclude each other.
    pub const fn is_discrete(self) -> bool {
        matches!(
            self,
            Self::Tap | Self::DoubleTap | Self::LongPress | Self::Swipe
        )
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tap => "tap",
            Self::DoubleTap => "double_tap",
            Self::LongPress => "long_press",
            Self::PanStart => "pan_start",
            Self::PanMove => "pan_move",
            Self::PanEnd => "pan_end",
            Self::Swipe => "swipe",
            Self::Pinch => "pinch",
        };
        f.write_str(name)
    }
}
