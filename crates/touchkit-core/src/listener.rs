//! Per-kind gesture listener registration.
//!
//! Each handler call is isolated: a panicking handler is logged and
//! skipped, its siblings still run, and it stays registered for later
//! sessions.

use crate::event::{GestureEvent, GestureKind};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// A gesture handler.
pub type GestureHandler = Box<dyn FnMut(&GestureEvent) + Send>;

/// Id returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Create a new listener ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers invoked.
    pub invoked: usize,
    /// Handlers that panicked.
    pub panicked: usize,
}

/// Handlers grouped by gesture kind, called in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    handlers: HashMap<ListenerId, GestureHandler>,
    by_kind: HashMap<GestureKind, Vec<ListenerId>>,
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`.
    pub fn register(&mut self, kind: GestureKind, handler: GestureHandler) -> ListenerId {
        let id = ListenerId::new(self.next_id);
        self.next_id += 1;
        self.handlers.insert(id, handler);
        self.by_kind.entry(kind).or_default().push(id);
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        if self.handlers.remove(&id).is_none() {
            return false;
        }
        for ids in self.by_kind.values_mut() {
            ids.retain(|registered| *registered != id);
        }
        true
    }

    /// Drop every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.by_kind.clear();
    }

    /// Total registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers registered for `kind`.
    pub fn count(&self, kind: GestureKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Call every handler registered for the event's kind.
    pub fn dispatch(&mut self, event: &GestureEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(ids) = self.by_kind.get(&event.kind()) else {
            return report;
        };

        for id in ids {
            let Some(handler) = self.handlers.get_mut(id) else {
                continue;
            };
            report.invoked += 1;
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                report.panicked += 1;
                tracing::warn!(listener = id.0, kind = %event.kind(), "gesture listener panicked");
            }
        }
        report
    }
}
