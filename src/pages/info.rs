//=========================================================================
// Info Pages
//=========================================================================
//
// Login, register and dashboard screens. Authentication itself belongs to
// the identity provider; these pages only report its state and lead back
// to the café.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::credits::CreditsBalance;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;
use crate::core::page::Page;

//=== InfoKind ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    Login,
    Register,
    Dashboard,
}

//=== InfoPage ============================================================

#[derive(Debug)]
pub struct InfoPage {
    kind: InfoKind,
    signed_in: bool,
    balance: CreditsBalance,
}

impl InfoPage {
    pub fn new(kind: InfoKind) -> Self {
        Self {
            kind,
            signed_in: false,
            balance: CreditsBalance::default(),
        }
    }

    pub fn kind(&self) -> InfoKind {
        self.kind
    }

    pub fn signed_in(&self) -> bool {
        self.signed_in
    }

    /// Balances as of the last update. Only tracked on the dashboard.
    pub fn balance(&self) -> CreditsBalance {
        self.balance
    }
}

impl Page<Route> for InfoPage {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        self.signed_in = context.identity.is_signed_in();
        if self.kind == InfoKind::Dashboard {
            context.refresh_credits();
        }
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        match event {
            CafeEvent::Back => {
                context.navigate(Route::Cafe);
                true
            }
            _ => false,
        }
    }

    fn update(&mut self, _dt: Duration, context: &mut GlobalContext) {
        self.signed_in = context.identity.is_signed_in();
        if self.kind == InfoKind::Dashboard {
            self.balance = context.credits.balance();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
