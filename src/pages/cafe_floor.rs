//=========================================================================
// Café Floor Page
//=========================================================================
//
// The 3D room: owns the Scene Navigator and the Interaction Router for as
// long as the page is on the stack.
//
// Flow:
//   click → InteractionRouter → ClickOutcome → SceneNavigator::set_target
//   update → navigator tween + router timers → navigate(Desktop | Leaderboard)
//
// Both components are created on enter and unmounted on exit, so nothing
// scheduled on the floor survives leaving it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;
use crate::core::interaction::{ClickOutcome, Destination, InteractionRouter, RouterRequest};
use crate::core::navigator::SceneNavigator;
use crate::core::page::Page;

//=== CafeFloorPage =======================================================

#[derive(Debug, Default)]
pub struct CafeFloorPage {
    navigator: Option<SceneNavigator>,
    router: Option<InteractionRouter>,
    last_outcome: Option<ClickOutcome>,
}

impl CafeFloorPage {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Query API --------------------------------------------------------

    /// Present only while the page is mounted.
    pub fn navigator(&self) -> Option<&SceneNavigator> {
        self.navigator.as_ref()
    }

    pub fn router(&self) -> Option<&InteractionRouter> {
        self.router.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&ClickOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.navigator.is_some() && self.router.is_some()
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply(&mut self, outcome: ClickOutcome) {
        if let (Some(camera), Some(navigator)) = (outcome.camera(), self.navigator.as_mut()) {
            navigator.set_target(Some(camera));
        }
        self.last_outcome = Some(outcome);
    }
}

impl Page<Route> for CafeFloorPage {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        let camera = &context.config.camera;
        self.navigator = Some(SceneNavigator::new(camera.initial_pose(), camera.bounds()));
        self.router = Some(InteractionRouter::from_config(&context.config));
        self.last_outcome = None;
        info!(target: "cafe", "Entered café floor");
    }

    fn on_exit(&mut self, _context: &mut GlobalContext) {
        if let Some(mut router) = self.router.take() {
            let cancelled = router.unmount();
            debug!(target: "cafe", "Router unmounted ({} timers cancelled)", cancelled);
        }
        if let Some(mut navigator) = self.navigator.take() {
            navigator.cancel();
        }
        self.last_outcome = None;
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        let Some(router) = self.router.as_mut() else {
            return false;
        };

        match event {
            CafeEvent::StationClicked(id) => match router.on_station_click(*id) {
                Ok(outcome) => self.apply(outcome),
                Err(e) => warn!(target: "cafe", "Ignoring click: {}", e),
            },
            CafeEvent::CashierClicked => {
                let outcome = router.on_cashier_click();
                self.apply(outcome);
            }
            CafeEvent::LeaderboardClicked => {
                let outcome = router.on_leaderboard_click();
                self.apply(outcome);
            }
            CafeEvent::CashierPayment => {
                if router.cashier_active() {
                    context.navigate(Route::Payment);
                } else {
                    debug!(target: "cafe", "Payment requested before visiting the cashier");
                }
            }
            CafeEvent::FreeLook {
                translate,
                look_delta,
            } => {
                if let Some(navigator) = self.navigator.as_mut() {
                    navigator.free_look(*translate, *look_delta);
                }
            }
            CafeEvent::ClearCameraTarget => {
                if let Some(navigator) = self.navigator.as_mut() {
                    navigator.set_target(None);
                }
            }
            _ => return false,
        }
        true
    }

    fn update(&mut self, dt: Duration, context: &mut GlobalContext) {
        if let Some(navigator) = self.navigator.as_mut() {
            if let Some(arrived) = navigator.update(dt.as_secs_f32()) {
                debug!(target: "cafe", "Camera arrived: {:?}", arrived);
            }
        }

        let Some(router) = self.router.as_mut() else {
            return;
        };
        for request in router.update(dt) {
            match request {
                RouterRequest::Navigate(Destination::Desktop(station)) => {
                    context.active_station = Some(station);
                    context.navigate(Route::Desktop);
                }
                RouterRequest::Navigate(Destination::Leaderboard) => {
                    context.navigate(Route::Leaderboard);
                }
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

    fn mounted() -> (CafeFloorPage, GlobalContext) {
        let mut context = signed_out_context();
        let mut page = CafeFloorPage::new();
        page.on_enter(&mut context);
        (page, context)
    }

    fn queued(context: &GlobalContext) -> Vec<PageTransition<Route>> {
        context.message_bus.read::<PageTransition<Route>>().to_vec()
    }

    //--- Lifecycle --------------------------------------------------------

    #[test]
    fn enter_mounts_and_exit_unmounts() {
        let (mut page, mut context) = mounted();
        assert!(page.is_mounted());

        page.handle(&CafeEvent::StationClicked(1), &mut context);
        page.on_exit(&mut context);

        assert!(!page.is_mounted());
        assert!(page.last_outcome().is_none());
    }

    #[test]
    fn events_before_mount_are_ignored() {
        let mut context = signed_out_context();
        let mut page = CafeFloorPage::new();
        assert!(!page.handle(&CafeEvent::StationClicked(1), &mut context));
    }

    //--- Clicks -----------------------------------------------------------

    #[test]
    fn free_station_travels_then_opens_desktop() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::StationClicked(1), &mut context);
        assert!(page.navigator().unwrap().is_animating());

        page.update(Duration::from_secs(2), &mut context);

        assert_eq!(context.active_station, Some(1));
        assert_eq!(
            queued(&context),
            vec![PageTransition::Clear, PageTransition::Push(Route::Desktop)]
        );
    }

    #[test]
    fn occupied_station_shows_overlay_without_camera_move() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::StationClicked(2), &mut context);

        assert!(matches!(page.last_outcome(), Some(ClickOutcome::Overlay { station: 2, .. })));
        assert!(!page.navigator().unwrap().is_animating());
        assert_eq!(page.router().unwrap().overlays().count(), 1);
    }

    #[test]
    fn unknown_station_is_consumed_without_effect() {
        let (mut page, mut context) = mounted();

        assert!(page.handle(&CafeEvent::StationClicked(99), &mut context));
        assert!(page.last_outcome().is_none());
    }

    #[test]
    fn payment_requires_cashier_visit() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::CashierPayment, &mut context);
        assert!(queued(&context).is_empty());

        page.handle(&CafeEvent::CashierClicked, &mut context);
        page.handle(&CafeEvent::CashierPayment, &mut context);
        assert_eq!(
            queued(&context),
            vec![PageTransition::Clear, PageTransition::Push(Route::Payment)]
        );
    }

    #[test]
    fn kiosk_click_opens_leaderboard() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::LeaderboardClicked, &mut context);
        page.update(Duration::from_secs(2), &mut context);

        assert_eq!(queued(&context).last(), Some(&PageTransition::Push(Route::Leaderboard)));
    }

    #[test]
    fn exit_cancels_pending_navigation() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::StationClicked(1), &mut context);
        page.on_exit(&mut context);
        page.update(Duration::from_secs(5), &mut context);

        assert!(queued(&context).is_empty());
        assert_eq!(context.active_station, None);
    }

    //--- Camera -----------------------------------------------------------

    #[test]
    fn clear_target_stops_animation() {
        let (mut page, mut context) = mounted();

        page.handle(&CafeEvent::CashierClicked, &mut context);
        page.handle(&CafeEvent::ClearCameraTarget, &mut context);

        assert!(!page.navigator().unwrap().is_animating());
    }
}
