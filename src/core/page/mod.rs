//=========================================================================
// Page System
//=========================================================================
//
// Manages page lifecycle and stack-based page switching.
//
// Architecture:
//   PageManager
//     ├─ pages: HashMap<R, Box<dyn Page<R>>>
//     └─ stack: Vec<R>
//
// Flow:
//   dispatch() → top page → Page::handle()
//   update()   → top page → Page::update()
//   process_transitions() → PageTransition<R> from the message bus
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;

//=== Module Declarations =================================================

mod page_manager;

//=== Public API ==========================================================

pub use page_manager::{PageKey, PageManager, PageTransition};

//=== Page Trait ==========================================================

/// A screen of the café with lifecycle hooks, event handling and update
/// logic.
///
/// Pages are registered once in a [`PageManager`] and keep their state
/// between activations. `on_exit` must release everything the page
/// scheduled: timers, tweens and game slots.
pub trait Page<R: PageKey>: Send {
    /// Called when the page enters the active stack.
    fn on_enter(&mut self, _context: &mut GlobalContext) {}

    /// Called when the page leaves the active stack.
    fn on_exit(&mut self, _context: &mut GlobalContext) {}

    /// Handles a user event. Only the top page receives events.
    ///
    /// Returns false when the event was ignored.
    fn handle(&mut self, _event: &CafeEvent, _context: &mut GlobalContext) -> bool {
        false
    }

    /// Called every tick while the page is on top of the stack.
    fn update(&mut self, dt: Duration, context: &mut GlobalContext);

    fn as_any(&self) -> &dyn Any;
}
