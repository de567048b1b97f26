//! Ready-made engines for common gesture interactions.

use std::sync::{Arc, Mutex};
use touchkit_core::{GestureConfig, GestureEngine, ListenerId, Point, SwipeDirection};

/// Engine that turns horizontal swipes into back/forward navigation.
///
/// Vertical swipes are ignored.
pub fn swipe_navigation<L, R>(mut on_left: L, mut on_right: R, config: GestureConfig) -> GestureEngine
where
    L: FnMut() + Send + 'static,
    R: FnMut() + Send + 'static,
{
    let mut engine = GestureEngine::with_config(config);
    engine.on_swipe(move |swipe| match swipe.direction {
        SwipeDirection::Left => on_left(),
        SwipeDirection::Right => on_right(),
        SwipeDirection::Up | SwipeDirection::Down => {}
    });
    engine
}

/// Engine that reports every pinch update as `(scale, center)`.
pub fn pinch_zoom<F>(mut on_zoom: F, config: GestureConfig) -> GestureEngine
where
    F: FnMut(f32, Point) + Send + 'static,
{
    let mut engine = GestureEngine::with_config(config);
    engine.on_pinch(move |pinch| on_zoom(pinch.scale, pinch.center));
    engine
}

#[derive(Debug)]
struct PullState {
    threshold: f32,
    pull_distance: f32,
    refreshing: bool,
}

impl PullState {
    fn max_pull(&self) -> f32 {
        self.threshold * 1.5
    }
}

type RefreshCallback = Box<dyn FnMut() + Send>;
type TopCheck = Box<dyn Fn() -> bool + Send + Sync>;

/// Pull-to-refresh tracking on top of pan gestures.
///
/// Downward pan movement accumulates while the content is scrolled to its
/// top. Releasing past the threshold calls the refresh callback once; it
/// stays latched until [`reset_refresh`](Self::reset_refresh).
pub struct PullToRefresh {
    state: Arc<Mutex<PullState>>,
    on_refresh: Arc<Mutex<RefreshCallback>>,
    at_top: Arc<TopCheck>,
    listeners: Vec<ListenerId>,
}

impl std::fmt::Debug for PullToRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullToRefresh")
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl PullToRefresh {
    /// Pull distance that triggers a refresh when none is given.
    pub const DEFAULT_THRESHOLD: f32 = 100.0;

    /// Create a tracker. `at_top` reports whether the content is scrolled
    /// to its top.
    pub fn new<R, T>(threshold: f32, on_refresh: R, at_top: T) -> Self
    where
        R: FnMut() + Send + 'static,
        T: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(PullState {
                threshold,
                pull_distance: 0.0,
                refreshing: false,
            })),
            on_refresh: Arc::new(Mutex::new(Box::new(on_refresh))),
            at_top: Arc::new(Box::new(at_top)),
            listeners: Vec::new(),
        }
    }

    /// Tracker with the default threshold for content that is always at top.
    pub fn with_default_threshold<R>(on_refresh: R) -> Self
    where
        R: FnMut() + Send + 'static,
    {
        Self::new(Self::DEFAULT_THRESHOLD, on_refresh, || true)
    }

    /// Register pan listeners on `engine`. Attaching again first detaches.
    pub fn attach(&mut self, engine: &mut GestureEngine) {
        self.detach(engine);

        let state = Arc::clone(&self.state);
        let at_top = Arc::clone(&self.at_top);
        let on_move = engine.on_pan_move(move |_, delta| {
            if !at_top() {
                return;
            }
            let mut state = state.lock().expect("pull state mutex not poisoned");
            let max = state.max_pull();
            state.pull_distance = (state.pull_distance + delta.y).clamp(0.0, max);
        });

        let state = Arc::clone(&self.state);
        let on_refresh = Arc::clone(&self.on_refresh);
        let on_end = engine.on_pan_end(move |_| {
            let trigger = {
                let mut state = state.lock().expect("pull state mutex not poisoned");
                let trigger = !state.refreshing && state.pull_distance >= state.threshold;
                if trigger {
                    state.refreshing = true;
                }
                state.pull_distance = 0.0;
                trigger
            };
            if trigger {
                tracing::debug!("pull to refresh triggered");
                let mut callback = on_refresh.lock().expect("refresh mutex not poisoned");
                callback();
            }
        });

        self.listeners = vec![on_move, on_end];
    }

    /// Remove the listeners registered by [`attach`](Self::attach).
    pub fn detach(&mut self, engine: &mut GestureEngine) {
        for id in self.listeners.drain(..) {
            engine.remove_listener(id);
        }
    }

    /// Current pull distance in pixels.
    pub fn pull_distance(&self) -> f32 {
        self.state().pull_distance
    }

    /// Pull distance over the threshold, capped at 1.
    pub fn pull_progress(&self) -> f32 {
        let state = self.state();
        if state.threshold <= 0.0 {
            return 1.0;
        }
        (state.pull_distance / state.threshold).min(1.0)
    }

    /// Whether a refresh was triggered and not yet reset.
    pub fn is_refreshing(&self) -> bool {
        self.state().refreshing
    }

    /// Re-arm the tracker once the refresh has completed.
    pub fn reset_refresh(&self) {
        let mut state = self.state();
        state.refreshing = false;
        state.pull_distance = 0.0;
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PullState> {
        self.state.lock().expect("pull state mutex not poisoned")
    }
}
