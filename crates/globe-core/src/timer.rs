//! Deterministic one-shot timers polled with the frame clock.
//!
//! Nothing here reads a wall clock: callers pass `now` as the time since the
//! engine started, which keeps the overlay state machine testable with
//! virtual time.

use std::time::Duration;

use fnv::FnvHashMap;
use smallvec::SmallVec;

/// Handle to a scheduled timer. Never reused within one [`Timers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due, with the deadline it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    pub id: TimerId,
    pub kind: K,
    pub deadline: Duration,
}

#[derive(Debug)]
pub struct Timers<K> {
    next_id: u64,
    pending: FnvHashMap<TimerId, (Duration, K)>,
}

impl<K: Copy> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Timers<K> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: FnvHashMap::default(),
        }
    }

    pub fn schedule(&mut self, deadline: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, (deadline, kind));
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().map(|(at, _)| *at).min()
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest first (ties broken by scheduling order).
    ///
    /// Follow-up timers should be anchored on [`Fired::deadline`], not `now`,
    /// so a late poll does not stretch a chain of timers.
    pub fn poll(&mut self, now: Duration) -> SmallVec<[Fired<K>; 2]> {
        let mut due: SmallVec<[(Duration, TimerId); 2]> = self
            .pending
            .iter()
            .filter(|(_, (at, _))| *at <= now)
            .map(|(id, (at, _))| (*at, *id))
            .collect();
        due.sort_unstable();
        due.into_iter()
            .filter_map(|(_, id)| {
                self.pending
                    .remove(&id)
                    .map(|(deadline, kind)| Fired { id, kind, deadline })
            })
            .collect()
    }
}
