//=========================================================================
// Global Systems
//=========================================================================
//
// Container for runtime systems with logic. Systems operate on
// GlobalContext data.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::debug;

//=== Internal Dependencies ===============================================

use super::GlobalContext;
use crate::core::event_bridge::CafeEvent;
use crate::core::notice::Notice;
use crate::core::page::{PageKey, PageManager};

//=== GlobalSystems =======================================================

pub struct GlobalSystems<R: PageKey> {
    /// Page lifecycle and stack.
    pub pages: PageManager<R>,
}

impl<R: PageKey> GlobalSystems<R> {
    pub(crate) fn new() -> Self {
        Self {
            pages: PageManager::new(),
        }
    }

    //--- Event Handling ---------------------------------------------------

    /// Applies runtime-level events and forwards the rest to the top page.
    pub(crate) fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) {
        match event {
            CafeEvent::IdentityChanged => {
                // Balances and in-flight replies belong to the previous identity
                context.credits.sign_out();
                if context.identity.is_signed_in() {
                    context.refresh_credits();
                }
            }
            _ => {
                if !self.pages.dispatch(event, context) {
                    debug!(target: "cafe", "Event ignored by {:?}: {:?}", self.pages.top(), event);
                }
            }
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one frame after events were handled.
    ///
    /// # Processing Pipeline
    ///
    /// 1. **Credits**: apply remote replies, publish their notices
    /// 2. **Pages**: update active pages
    /// 3. **Transitions**: apply queued page transitions
    pub(crate) fn update(&mut self, dt: Duration, context: &mut GlobalContext) {
        for notice in context.credits.poll() {
            context.message_bus.push::<Notice>(notice);
        }

        self.pages.update(dt, context);

        self.pages.process_transitions(context);
    }
}
