//=========================================================================
// Door Page
//=========================================================================
//
// Landing page. Clicking the door plays the opening animation and enters
// the café floor once it has finished.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;
use crate::core::page::Page;
use crate::core::scheduler::{Scheduler, TimerId};

//=== DoorPage ============================================================

#[derive(Debug, Default)]
pub struct DoorPage {
    scheduler: Scheduler<()>,
    opening: Option<TimerId>,
}

impl DoorPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between the click and entering the café.
    pub fn is_opening(&self) -> bool {
        self.opening.is_some()
    }
}

impl Page<Route> for DoorPage {
    fn on_exit(&mut self, _context: &mut GlobalContext) {
        self.scheduler.clear();
        self.opening = None;
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        match event {
            CafeEvent::DoorClicked => {
                if self.opening.is_none() {
                    info!(target: "door", "Door opening");
                    self.opening = Some(self.scheduler.set_timeout(context.config.door_delay(), ()));
                } else {
                    debug!(target: "door", "Door already opening");
                }
                true
            }
            _ => false,
        }
    }

    fn update(&mut self, dt: Duration, context: &mut GlobalContext) {
        self.scheduler.advance(dt);
        while let Some((id, ())) = self.scheduler.next_due() {
            if self.opening == Some(id) {
                self.opening = None;
                context.navigate(Route::Cafe);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::PageTransition;
    use crate::core::testing::signed_out_context;

    fn queued(context: &GlobalContext) -> Vec<PageTransition<Route>> {
        context.message_bus.read::<PageTransition<Route>>().to_vec()
    }

    #[test]
    fn door_click_enters_cafe_after_delay() {
        let mut context = signed_out_context();
        let mut door = DoorPage::new();

        assert!(door.handle(&CafeEvent::DoorClicked, &mut context));
        door.update(Duration::from_millis(1_199), &mut context);
        assert!(queued(&context).is_empty());
        assert!(door.is_opening());

        door.update(Duration::from_millis(1), &mut context);
        assert_eq!(
            queued(&context),
            vec![PageTransition::Clear, PageTransition::Push(Route::Cafe)]
        );
        assert!(!door.is_opening());
    }

    #[test]
    fn repeated_clicks_navigate_once() {
        let mut context = signed_out_context();
        let mut door = DoorPage::new();

        door.handle(&CafeEvent::DoorClicked, &mut context);
        door.update(Duration::from_millis(600), &mut context);
        door.handle(&CafeEvent::DoorClicked, &mut context);
        door.update(Duration::from_secs(5), &mut context);

        assert_eq!(queued(&context).len(), 2);
    }

    #[test]
    fn exit_cancels_pending_opening() {
        let mut context = signed_out_context();
        let mut door = DoorPage::new();

        door.handle(&CafeEvent::DoorClicked, &mut context);
        door.on_exit(&mut context);
        door.update(Duration::from_secs(5), &mut context);

        assert!(queued(&context).is_empty());
    }

    #[test]
    fn other_events_are_ignored() {
        let mut context = signed_out_context();
        assert!(!DoorPage::new().handle(&CafeEvent::CashierClicked, &mut context));
    }
}
