//=========================================================================
// Scheduler
//=========================================================================
//
// Cancellable timer queue driven by a simulated clock.
//
// Architecture:
//   set_timeout() / set_interval() → SlotMap<TimerId, TimerEntry<T>>
//                                          ↓
//   advance(dt) moves the horizon → next_due() pops (id, payload)
//                                          ↓
//   Owner dispatches payload, may cancel other timers in between
//
// Timers fire in (due time, creation order). Popping one at a time lets
// a handler cancel timers that would otherwise fire later in the same
// frame. Timers created while a frame is draining wait for the next
// advance, so a handler that re-arms itself cannot stall the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

//=== TimerId =============================================================

new_key_type! {
    /// Handle to a scheduled timer. Stale after the timer fires or is cancelled.
    pub struct TimerId;
}

//=== TimerEntry ==========================================================

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    due: Duration,
    period: Option<Duration>,
    seq: u64,
    born: u64,
    payload: T,
}

//=== Scheduler ===========================================================

/// Single-threaded timer queue on a simulated clock.
///
/// Each component that needs delayed work owns one scheduler. Dropping or
/// clearing the scheduler cancels everything it holds.
#[derive(Debug)]
pub struct Scheduler<T: Clone> {
    now: Duration,
    horizon: Duration,
    next_seq: u64,
    frame_start: u64,
    timers: SlotMap<TimerId, TimerEntry<T>>,
}

impl<T: Clone> Scheduler<T> {
    /// Shortest interval period accepted. Zero periods are raised to this.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// Creates an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_seq: 0,
            frame_start: 0,
            timers: SlotMap::with_key(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Schedules a one-shot timer `delay` after the current time.
    pub fn set_timeout(&mut self, delay: Duration, payload: T) -> TimerId {
        self.insert(self.now + delay, None, payload)
    }

    /// Schedules a repeating timer. The first firing is one period from now.
    pub fn set_interval(&mut self, period: Duration, payload: T) -> TimerId {
        let period = period.max(Self::MIN_PERIOD);
        self.insert(self.now + period, Some(period), payload)
    }

    /// Cancels a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Cancels every pending timer and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    //--- Query API --------------------------------------------------------

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time remaining until the given timer fires.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.timers
            .get(id)
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    //--- Clock ------------------------------------------------------------

    /// Moves the frame horizon forward by `dt`.
    ///
    /// Timers due before the new horizon are returned by [`Self::next_due`].
    /// The clock itself advances as timers are popped. Only timers that
    /// exist when `advance` is called are eligible in this frame.
    pub fn advance(&mut self, dt: Duration) {
        self.horizon = self.horizon.max(self.now) + dt;
        self.frame_start = self.next_seq;
    }

    /// Pops the earliest timer due at or before the horizon.
    ///
    /// Intervals are rescheduled before being returned, so cancelling the
    /// returned id from the handler stops the interval. When nothing is due
    /// the clock catches up to the horizon and `None` is returned.
    pub fn next_due(&mut self) -> Option<(TimerId, T)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.born < self.frame_start && entry.due <= self.horizon)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(id, _)| id);

        let Some(id) = id else {
            self.now = self.horizon;
            return None;
        };

        let seq = self.bump_seq();
        let entry = self.timers.get_mut(id)?;
        self.now = self.now.max(entry.due);
        let payload = entry.payload.clone();

        match entry.period {
            Some(period) => {
                entry.due += period;
                entry.seq = seq;
            }
            None => {
                self.timers.remove(id);
            }
        }

        Some((id, payload))
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert(&mut self, due: Duration, period: Option<Duration>, payload: T) -> TimerId {
        let seq = self.bump_seq();
        self.timers.insert(TimerEntry {
            due,
            period,
            seq,
            born: seq,
            payload,
        })
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
