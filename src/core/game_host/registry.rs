//=========================================================================
// Session Registry
//=========================================================================
//
// Per-game record of every timer and listener created through the game
// handle. Teardown drains the registry; anything recorded here is gone
// once the session ends.
//
//=========================================================================

//=== External Dependencies ===============================================

use slotmap::{new_key_type, SlotMap};

//=== Internal Dependencies ===============================================

use crate::core::input::ListenerKind;
use crate::core::scheduler::TimerId;

//=== ListenerId ==========================================================

new_key_type! {
    /// Handle to a listener registered by a game.
    pub struct ListenerId;
}

//=== SessionRegistry =====================================================

/// Timers and listeners owned by one mounted game.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    timers: Vec<TimerId>,
    listeners: SlotMap<ListenerId, ListenerKind>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Timers -----------------------------------------------------------

    pub fn record_timer(&mut self, id: TimerId) {
        if !self.timers.contains(&id) {
            self.timers.push(id);
        }
    }

    /// Drops a timer that fired or was cleared by the game.
    pub fn forget_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| *timer != id);
        before != self.timers.len()
    }

    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.timers.contains(&id)
    }

    pub fn timer_ids(&self) -> &[TimerId] {
        &self.timers
    }

    /// Removes and returns every recorded timer.
    pub fn drain_timers(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.timers)
    }

    //--- Listeners --------------------------------------------------------

    pub fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.insert(kind)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn listens_to(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|registered| *registered == kind)
    }

    /// Removes every listener and returns how many there were.
    pub fn drain_listeners(&mut self) -> usize {
        let count = self.listeners.len();
        self.listeners.clear();
        count
    }

    //--- Query API --------------------------------------------------------

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.listeners.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================
