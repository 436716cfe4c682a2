//=========================================================================
// Game Handle
//=========================================================================
//
// The only way an embedded game reaches the outside world. Every timer
// and listener it creates is recorded in its session registry, so the
// host can reverse all of it on teardown.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::registry::{ListenerId, SessionRegistry};
use crate::core::input::{GameInput, KeyCode, ListenerKind};
use crate::core::scheduler::{Scheduler, TimerId};

//=== Slot Ownership ======================================================

/// Which mounted game in a session owns a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSlot {
    Primary,
    Fallback,
}

/// Payload of timers in the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HostTimer {
    Game { owner: GameSlot, tag: u32 },
    ReadyProbe,
    AutoStart(KeyCode),
}

//=== Readiness ===========================================================

/// Result of mounting a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Playable immediately.
    Ready,

    /// Will call [`GameHandle::signal_ready`] later.
    Pending,
}

//=== EmbeddedGame ========================================================

/// A game mounted into a host container.
pub trait EmbeddedGame: Send {
    fn name(&self) -> &str;

    /// Creates the game's timers and listeners through `handle`.
    fn mount(&mut self, handle: &mut GameHandle<'_>) -> Readiness;

    /// Called when a timer created with `tag` fires.
    fn on_timer(&mut self, tag: u32, handle: &mut GameHandle<'_>);

    /// Called for input matching a registered listener.
    fn on_input(&mut self, input: GameInput, handle: &mut GameHandle<'_>);

    /// Game-specific cleanup, run after the host removed everything it registered.
    fn shutdown(&mut self) {}

    fn score(&self) -> u64 {
        0
    }

    fn is_over(&self) -> bool {
        false
    }
}

//=== GameHandle ==========================================================

/// Capability handle passed to every [`EmbeddedGame`] callback.
pub struct GameHandle<'a> {
    owner: GameSlot,
    scheduler: &'a mut Scheduler<HostTimer>,
    registry: &'a mut SessionRegistry,
    frame: &'a mut Option<String>,
    ready: &'a mut bool,
}

impl<'a> GameHandle<'a> {
    pub(super) fn new(
        owner: GameSlot,
        scheduler: &'a mut Scheduler<HostTimer>,
        registry: &'a mut SessionRegistry,
        frame: &'a mut Option<String>,
        ready: &'a mut bool,
    ) -> Self {
        Self {
            owner,
            scheduler,
            registry,
            frame,
            ready,
        }
    }

    //--- Timers -----------------------------------------------------------

    pub fn set_interval(&mut self, period: Duration, tag: u32) -> TimerId {
        let id = self.scheduler.set_interval(period, self.timer(tag));
        self.registry.record_timer(id);
        id
    }

    pub fn set_timeout(&mut self, delay: Duration, tag: u32) -> TimerId {
        let id = self.scheduler.set_timeout(delay, self.timer(tag));
        self.registry.record_timer(id);
        id
    }

    /// Cancels one of this game's timers. Other games' timers are untouched.
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        if !self.registry.forget_timer(id) {
            return false;
        }
        self.scheduler.cancel(id)
    }

    //--- Listeners --------------------------------------------------------

    pub fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        self.registry.add_listener(kind)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.registry.remove_listener(id)
    }

    //--- Output -----------------------------------------------------------

    /// Replaces the container content at the end of this callback.
    pub fn render(&mut self, content: impl Into<String>) {
        *self.frame = Some(content.into());
    }

    pub fn signal_ready(&mut self) {
        *self.ready = true;
    }

    pub fn owner(&self) -> GameSlot {
        self.owner
    }

    fn timer(&self, tag: u32) -> HostTimer {
        HostTimer::Game {
            owner: self.owner,
            tag,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_records_everything_it_creates() {
        let mut scheduler = Scheduler::new();
        let mut registry = SessionRegistry::new();
        let mut frame = None;
        let mut ready = false;

        let mut handle = GameHandle::new(
            GameSlot::Primary,
            &mut scheduler,
            &mut registry,
            &mut frame,
            &mut ready,
        );
        let tick = handle.set_interval(Duration::from_millis(33), 1);
        handle.set_timeout(Duration::from_millis(100), 2);
        handle.listen(ListenerKind::KeyDown);
        handle.render("frame 0");
        handle.signal_ready();

        assert!(handle.clear_timer(tick));
        assert!(!handle.clear_timer(tick));

        assert_eq!(registry.timer_count(), 1);
        assert_eq!(registry.listener_count(), 1);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(frame.as_deref(), Some("frame 0"));
        assert!(ready);
    }

    #[test]
    fn handle_cannot_clear_foreign_timers() {
        let mut scheduler = Scheduler::new();
        let foreign = scheduler.set_timeout(Duration::from_millis(10), HostTimer::ReadyProbe);
        let mut registry = SessionRegistry::new();
        let mut frame = None;
        let mut ready = false;

        let mut handle = GameHandle::new(
            GameSlot::Fallback,
            &mut scheduler,
            &mut registry,
            &mut frame,
            &mut ready,
        );
        assert!(!handle.clear_timer(foreign));
        assert!(scheduler.is_pending(foreign));
    }
}
