//=========================================================================
// Payment Page
//=========================================================================
//
// Cashier checkout: buys account credits through the credits service.
// The purchase runs on the credits worker; its outcome arrives as a
// notice on a later tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;
use crate::core::notice::Notice;
use crate::core::page::Page;

//=== PaymentPage =========================================================

#[derive(Debug, Default)]
pub struct PaymentPage {
    pending: Option<u64>,
}

impl PaymentPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of the purchase awaiting a reply.
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }
}

impl Page<Route> for PaymentPage {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        self.pending = None;
        context.refresh_credits();
    }

    fn on_exit(&mut self, _context: &mut GlobalContext) {
        self.pending = None;
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        match event {
            CafeEvent::PurchaseCredits(amount) => {
                match context.credits.purchase(context.identity.as_ref(), *amount) {
                    Ok(()) => {
                        info!(target: "payment", "Purchasing {} credits", amount);
                        self.pending = Some(*amount);
                    }
                    Err(e) => context.notify(Notice::PurchaseFailed {
                        amount: *amount,
                        reason: e.to_string(),
                    }),
                }
            }
            CafeEvent::Back => context.navigate(Route::Cafe),
            _ => return false,
        }
        true
    }

    fn update(&mut self, _dt: Duration, context: &mut GlobalContext) {
        let Some(amount) = self.pending else {
            return;
        };
        let settled = context.message_bus.read::<Notice>().iter().any(|notice| {
            matches!(
                notice,
                Notice::PurchaseCompleted { amount: a, .. } | Notice::PurchaseFailed { amount: a, .. }
                    if *a == amount
            )
        });
        if settled {
            self.pending = None;
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
    use crate::core::testing::{signed_in_context, signed_out_context};

    fn settle_tick(page: &mut PaymentPage, context: &mut GlobalContext) {
        assert!(context.credits.settle(Duration::from_secs(2)));
        for notice in context.credits.poll() {
            context.notify(notice);
        }
        page.update(Duration::from_millis(16), context);
    }

    #[test]
    fn purchase_raises_account_balance() {
        let mut context = signed_in_context(40);
        let mut page = PaymentPage::new();
        page.on_enter(&mut context);

        page.handle(&CafeEvent::PurchaseCredits(100), &mut context);
        assert_eq!(page.pending(), Some(100));

        settle_tick(&mut page, &mut context);

        assert_eq!(page.pending(), None);
        assert_eq!(context.credits.account_credits(), 140);
        assert_eq!(
            context.message_bus.read::<Notice>(),
            &[Notice::PurchaseCompleted {
                amount: 100,
                account_credits: 140
            }]
        );
    }

    #[test]
    fn signed_out_purchase_fails_immediately() {
        let mut context = signed_out_context();
        let mut page = PaymentPage::new();

        page.handle(&CafeEvent::PurchaseCredits(100), &mut context);

        assert_eq!(page.pending(), None);
        assert!(matches!(
            context.message_bus.read::<Notice>(),
            [Notice::PurchaseFailed { amount: 100, .. }]
        ));
    }

    #[test]
    fn back_returns_to_cafe() {
        let mut context = signed_out_context();
        assert!(PaymentPage::new().handle(&CafeEvent::Back, &mut context));
        assert_eq!(context.message_bus.total(), 2);
    }
}
