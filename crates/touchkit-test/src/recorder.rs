//! Listener-side capture of delivered gestures.

use std::sync::{Arc, Mutex};
use touchkit_core::{GestureEngine, GestureEvent, GestureKind, ListenerId};

/// Registers one listener per gesture kind and keeps what they receive.
///
/// Unlike the events returned by `process`, this sees exactly what
/// registered handlers see, including dispatch order across kinds.
#[derive(Debug, Clone, Default)]
pub struct GestureRecorder {
    received: Arc<Mutex<Vec<GestureEvent>>>,
    ids: Vec<ListenerId>,
}

impl GestureRecorder {
    /// Attach a recorder for every kind.
    pub fn attach(engine: &mut GestureEngine) -> Self {
        Self::attach_kinds(engine, &GestureKind::ALL)
    }

    /// Attach a recorder for the given kinds only.
    pub fn attach_kinds(engine: &mut GestureEngine, kinds: &[GestureKind]) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let ids = kinds
            .iter()
            .map(|&kind| {
                let sink = Arc::clone(&received);
                engine.on(kind, move |event| {
                    sink.lock()
                        .expect("recorder mutex not poisoned")
                        .push(*event);
                })
            })
            .collect();
        Self { received, ids }
    }

    /// Remove the recorder's listeners. Recorded gestures are kept.
    pub fn detach(&mut self, engine: &mut GestureEngine) {
        for id in self.ids.drain(..) {
            engine.remove_listener(id);
        }
    }

    /// Gestures received so far.
    pub fn events(&self) -> Vec<GestureEvent> {
        self.received
            .lock()
            .expect("recorder mutex not poisoned")
            .clone()
    }

    /// Kinds of the gestures received so far.
    pub fn kinds(&self) -> Vec<GestureKind> {
        self.events().iter().map(GestureEvent::kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchkit_core::TouchInput;

    #[test]
    fn test_records_every_kind() {
        let mut engine = GestureEngine::new();
        let recorder = GestureRecorder::attach(&mut engine);
        assert_eq!(engine.listener_count(GestureKind::Pinch), 1);

        engine.process(&TouchInput::start(0.0, 0.0, 0));
        engine.process(&TouchInput::moved(40.0, 0.0, 20));
        engine.process(&TouchInput::end(120.0, 0.0, 50));

        assert_eq!(
            recorder.kinds(),
            vec![
                GestureKind::PanStart,
                GestureKind::PanMove,
                GestureKind::PanEnd,
                GestureKind::Swipe
            ]
        );
    }

    #[test]
    fn test_detach_removes_listeners() {
        let mut engine = GestureEngine::new();
        let mut recorder = GestureRecorder::attach_kinds(&mut engine, &[GestureKind::LongPress]);
        recorder.detach(&mut engine);
        assert_eq!(engine.listener_count(GestureKind::LongPress), 0);

        engine.process(&TouchInput::start(0.0, 0.0, 0));
        engine.advance_to(1_000);
        assert!(recorder.events().is_empty());
    }
}
