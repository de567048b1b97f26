//! Deterministic one-shot timers driven by a host-supplied millisecond clock.
//!
//! Nothing here reads wall time. The engine advances the queue with the
//! timestamps it receives, which keeps recognition reproducible in tests
//! and replays.

use std::collections::BTreeMap;

/// Handle of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw id, unique within one queue.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// One-shot timers keyed by deadline, firing in deadline then schedule order.
#[derive(Debug)]
pub struct TimerQueue<A> {
    /// Pending timers by (deadline, handle).
    pending: BTreeMap<(u64, TimerHandle), A>,
    /// Deadline lookup so cancel does not need a scan.
    deadlines: BTreeMap<TimerHandle, u64>,
    /// Next handle id.
    next_id: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` to fire at `deadline_ms`.
    pub fn schedule(&mut self, deadline_ms: u64, action: A) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert((deadline_ms, handle), action);
        self.deadlines.insert(handle, deadline_ms);
        handle
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => self.pending.remove(&(deadline, handle)).is_some(),
            None => false,
        }
    }

    /// Whether `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at or before `now_ms`.
    ///
    /// Call repeatedly until `None`: an action may cancel later timers, and
    /// those must not fire.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, u64, A)> {
        let (&(deadline, handle), _) = self.pending.iter().next()?;
        if deadline > now_ms {
            return None;
        }
        let action = self.pending.remove(&(deadline, handle))?;
        self.deadlines.remove(&handle);
        Some((handle, deadline, action))
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timer_fires_at_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(500, "long_press");

        assert!(queue.pop_due(499).is_none());
        let (_, deadline, action) = queue.pop_due(500).unwrap();
        assert_eq!(deadline, 500);
        assert_eq!(action, "long_press");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_timers_fire_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(300, 'c');
        queue.schedule(100, 'a');
        queue.schedule(100, 'b');

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(1000))
            .map(|(_, _, a)| a)
            .collect();
        assert_eq!(fired, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(100, ());

        assert!(queue.is_pending(handle));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(!queue.is_pending(handle));
        assert!(queue.pop_due(1000).is_none());
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(100, ());
        assert!(queue.pop_due(100).is_some());
        assert!(!queue.cancel(handle));
    }

    #[test]
    fn test_cancel_during_same_tick_wins() {
        let mut queue = TimerQueue::new();
        let first = queue.schedule(100, 1);
        let second = queue.schedule(100, 2);

        let (handle, _, _) = queue.pop_due(100).unwrap();
        assert_eq!(handle, first);
        // The first action cancels the second before it is popped.
        assert!(queue.cancel(second));
        assert!(queue.pop_due(100).is_none());
    }

    #[test]
    fn test_next_deadline_and_clear() {
        let mut queue = TimerQueue::new();
        assert_eq!(queue.next_deadline(), None);
        queue.schedule(250, ());
        queue.schedule(120, ());
        assert_eq!(queue.next_deadline(), Some(120));
        assert_eq!(queue.len(), 2);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }

    proptest! {
        #[test]
        fn prop_cancelled_timers_never_fire(deadlines in proptest::collection::vec(0u64..1000, 1..20), cancel_mask in proptest::collection::vec(any::<bool>(), 20)) {
            let mut queue = TimerQueue::new();
            let handles: Vec<_> = deadlines.iter().enumerate().map(|(i, d)| queue.schedule(*d, i)).collect();
            let mut cancelled = Vec::new();
            for (i, handle) in handles.iter().enumerate() {
                if cancel_mask[i] {
                    queue.cancel(*handle);
                    queue.cancel(*handle);
                    cancelled.push(i);
                }
            }
            let mut last_deadline = 0;
            while let Some((_, deadline, action)) = queue.pop_due(u64::MAX) {
                prop_assert!(!cancelled.contains(&action));
                prop_assert!(deadline >= last_deadline);
                last_deadline = deadline;
            }
        }
    }
}
