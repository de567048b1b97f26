//! Input surfaces and engine attachment.
//!
//! A [`TouchSurface`] is anything that delivers [`TouchInput`] frames to
//! subscribers: a DOM element in the browser, or an [`EventSurface`] the host
//! pushes frames into. [`SurfaceBinding`] connects a shared engine to a
//! surface and removes exactly its own subscription on detach.

use std::sync::{Arc, Mutex};
use touchkit_core::{GestureConfig, GestureEngine, GestureEvent, TouchInput, TouchPhase};

/// Engine shared between a surface listener and the host.
pub type SharedEngine = Arc<Mutex<GestureEngine>>;

/// Frame listener. Returns `true` to request that the platform default
/// (scrolling) be prevented.
pub type SurfaceListener = Box<dyn FnMut(&TouchInput) -> bool + Send>;

/// Wrap an engine for sharing.
pub fn shared(engine: GestureEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

/// Options applied to a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubscribeOptions {
    /// Passive listeners cannot prevent the platform default.
    pub passive: bool,
}

impl SubscribeOptions {
    /// Passive unless the configuration asks to block scrolling.
    pub const fn for_config(config: &GestureConfig) -> Self {
        Self {
            passive: !config.prevent_default_scrolling,
        }
    }
}

/// Handle of one subscription on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceSubscription(pub u64);

/// A source of touch frames.
pub trait TouchSurface {
    /// Start delivering frames to `listener`.
    fn subscribe(
        &mut self,
        options: SubscribeOptions,
        listener: SurfaceListener,
    ) -> SurfaceSubscription;

    /// Stop delivering frames. Returns `false` for unknown subscriptions.
    fn unsubscribe(&mut self, subscription: SurfaceSubscription) -> bool;
}

struct Subscriber {
    id: SurfaceSubscription,
    options: SubscribeOptions,
    listener: SurfaceListener,
}

/// In-process surface fed by the host with [`EventSurface::dispatch`].
#[derive(Default)]
pub struct EventSurface {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for EventSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSurface")
            .field("listeners", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl EventSurface {
    /// Create a surface with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a frame to every subscriber in subscription order.
    ///
    /// Returns whether a non-passive subscriber asked to prevent the
    /// default. Requests from passive subscribers are ignored.
    pub fn dispatch(&mut self, input: &TouchInput) -> bool {
        let mut prevented = false;
        for subscriber in &mut self.subscribers {
            let wants_prevent = (subscriber.listener)(input);
            if wants_prevent && !subscriber.options.passive {
                prevented = true;
            }
        }
        prevented
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl TouchSurface for EventSurface {
    fn subscribe(
        &mut self,
        options: SubscribeOptions,
        listener: SurfaceListener,
    ) -> SurfaceSubscription {
        let id = SurfaceSubscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            options,
            listener,
        });
        id
    }

    fn unsubscribe(&mut self, subscription: SurfaceSubscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != subscription);
        self.subscribers.len() != before
    }
}

/// A live connection between a surface and a shared engine.
#[derive(Debug)]
pub struct SurfaceBinding {
    engine: SharedEngine,
    subscription: Option<SurfaceSubscription>,
}

impl SurfaceBinding {
    /// Feed every frame from `surface` into `engine`.
    pub fn attach<S>(surface: &mut S, engine: SharedEngine) -> Self
    where
        S: TouchSurface + ?Sized,
    {
        let (options, prevent) = {
            let guard = engine.lock().expect("engine mutex not poisoned");
            let config = guard.config();
            (
                SubscribeOptions::for_config(config),
                config.prevent_default_scrolling,
            )
        };

        let target = Arc::clone(&engine);
        let subscription = surface.subscribe(
            options,
            Box::new(move |input| {
                let mut engine = target.lock().expect("engine mutex not poisoned");
                engine.process(input);
                prevent && matches!(input.phase, TouchPhase::Start | TouchPhase::Move)
            }),
        );
        tracing::debug!(subscription = subscription.0, passive = options.passive, "attached");

        Self {
            engine,
            subscription: Some(subscription),
        }
    }

    /// Remove the subscription. Returns `false` if already detached.
    pub fn detach<S>(&mut self, surface: &mut S) -> bool
    where
        S: TouchSurface + ?Sized,
    {
        let Some(subscription) = self.subscription.take() else {
            return false;
        };
        tracing::debug!(subscription = subscription.0, "detached");
        surface.unsubscribe(subscription)
    }

    /// Whether the binding still holds a subscription.
    pub const fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// The engine frames are fed into.
    pub const fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Fire engine timers due at or before `now_ms`.
    pub fn pump(&self, now_ms: u64) -> Vec<GestureEvent> {
        self.engine
            .lock()
            .expect("engine mutex not poisoned")
            .advance_to(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passive_listener_cannot_prevent() {
        let mut surface = EventSurface::new();
        surface.subscribe(SubscribeOptions { passive: true }, Box::new(|_| true));
        assert!(!surface.dispatch(&TouchInput::start(0.0, 0.0, 0)));

        surface.subscribe(SubscribeOptions { passive: false }, Box::new(|_| true));
        assert!(surface.dispatch(&TouchInput::start(0.0, 0.0, 0)));
    }

    #[test]
    fn test_unsubscribe_unknown() {
        let mut surface = EventSurface::new();
        assert!(!surface.unsubscribe(SurfaceSubscription(7)));
    }

    #[test]
    fn test_options_follow_config() {
        let config = GestureConfig::default();
        assert!(SubscribeOptions::for_config(&config).passive);
        let blocking = config.with_prevent_default_scrolling(true);
        assert!(!SubscribeOptions::for_config(&blocking).passive);
    }

    #[test]
    fn test_binding_feeds_engine() {
        let mut surface = EventSurface::new();
        let engine = shared(GestureEngine::new());
        let binding = SurfaceBinding::attach(&mut surface, Arc::clone(&engine));

        assert!(!surface.dispatch(&TouchInput::start(3.0, 4.0, 0)));
        assert_eq!(engine.lock().unwrap().touch_count(), 1);
        surface.dispatch(&TouchInput::end(3.0, 4.0, 20));

        let events = binding.pump(1_000);
        assert_eq!(
            events,
            vec![GestureEvent::Tap {
                position: touchkit_core::Point::new(3.0, 4.0)
            }]
        );
    }

    #[test]
    fn test_blocking_config_prevents_start_and_move_only() {
        let mut surface = EventSurface::new();
        let engine = shared(GestureEngine::with_config(
            GestureConfig::default().with_prevent_default_scrolling(true),
        ));
        let _binding = SurfaceBinding::attach(&mut surface, engine);

        assert!(surface.dispatch(&TouchInput::start(0.0, 0.0, 0)));
        assert!(surface.dispatch(&TouchInput::moved(30.0, 0.0, 10)));
        assert!(!surface.dispatch(&TouchInput::end(30.0, 0.0, 20)));
    }
}
