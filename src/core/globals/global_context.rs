//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for pages.
//
// Contains state that pages read and write:
// - message_bus: page transitions and notices for the current tick
// - credits: the signed-in user's credits session
// - identity: external identity provider
// - config: runtime configuration
// - active_station: terminal the visitor sat down at
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::config::CafeConfig;
use crate::core::credits::CreditsSession;
use crate::core::identity::IdentityProvider;
use crate::core::interaction::StationId;
use crate::core::message_bus::MessageBus;
use crate::core::notice::Notice;
use crate::core::page::{PageKey, PageTransition};

//=== GlobalContext =======================================================

/// Shared context passed to every page callback.
pub struct GlobalContext {
    /// Per-tick typed messages. Cleared at every tick boundary.
    pub message_bus: MessageBus,

    /// Credits state, owned here rather than cached globally.
    pub credits: CreditsSession,

    pub identity: Arc<dyn IdentityProvider>,

    pub config: CafeConfig,

    /// Station selected on the café floor, read by the desktop page.
    pub active_station: Option<StationId>,
}

impl GlobalContext {
    pub fn new(config: CafeConfig, credits: CreditsSession, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            message_bus: MessageBus::new(),
            credits,
            identity,
            config,
            active_station: None,
        }
    }

    //--- Messaging --------------------------------------------------------

    /// Queues a user-visible notice.
    pub fn notify(&mut self, notice: Notice) {
        self.message_bus.push(notice);
    }

    /// Leaves every page on the stack and opens `route`.
    pub fn navigate<R: PageKey>(&mut self, route: R) {
        self.message_bus.push(PageTransition::<R>::Clear);
        self.message_bus.push(PageTransition::Push(route));
    }

    //--- Identity ---------------------------------------------------------

    /// Refreshes the credits balance for the current identity.
    pub fn refresh_credits(&mut self) {
        self.credits.refresh(self.identity.as_ref());
    }
}
