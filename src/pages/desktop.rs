//=========================================================================
// Desktop Page
//=========================================================================
//
// The screen of the station the visitor sat down at: game tiles, the
// credit-loading prompt and the game modal.
//
// Flow:
//   tile click → authorize_launch(cost)
//     Granted        → GameHost::open → modal
//     NeedsTransfer  → credit prompt (100 / 250 / 500 / all)
//     NeedsPurchase  → "go to cashier" prompt → Payment
//   close / back / exit → GameHost::teardown
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::Route;
use crate::core::config::CafeConfig;
use crate::core::credits::LaunchDecision;
use crate::core::event_bridge::CafeEvent;
use crate::core::game_host::{
    GameCatalog, GameHost, HeadlessEnvironment, HostEnvironment, HostEvent, SlotState, TeardownReport,
};
use crate::core::globals::GlobalContext;
use crate::core::interaction::StationId;
use crate::core::notice::Notice;
use crate::core::page::Page;

//=== Constants ===========================================================

/// Amounts offered by the credit prompt, besides "all".
pub const LOAD_OPTIONS: [u64; 3] = [100, 250, 500];

const GAME_CONTAINER: &str = "game-modal";

//=== DesktopPage =========================================================

pub struct DesktopPage<E: HostEnvironment = HeadlessEnvironment> {
    catalog: GameCatalog,
    host: GameHost<E>,
    station: Option<StationId>,
    /// Game whose launch is waiting on loaded credits.
    credit_prompt: Option<String>,
    /// Game the visitor cannot afford at all.
    purchase_prompt: Option<String>,
    last_report: Option<TeardownReport>,
}

impl<E: HostEnvironment> DesktopPage<E> {
    pub fn new(catalog: GameCatalog, env: E, config: &CafeConfig) -> Self {
        Self {
            catalog,
            host: GameHost::from_config(env, GAME_CONTAINER, config),
            station: None,
            credit_prompt: None,
            purchase_prompt: None,
            last_report: None,
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn host(&self) -> &GameHost<E> {
        &self.host
    }

    pub fn station(&self) -> Option<StationId> {
        self.station
    }

    pub fn credit_prompt(&self) -> Option<&str> {
        self.credit_prompt.as_deref()
    }

    pub fn purchase_prompt(&self) -> Option<&str> {
        self.purchase_prompt.as_deref()
    }

    pub fn modal_open(&self) -> bool {
        self.host.is_open()
    }

    /// Slot lifecycle state of the modal.
    pub fn slot_state(&self) -> &SlotState {
        self.host.state()
    }

    /// Report of the most recent modal close.
    pub fn last_report(&self) -> Option<&TeardownReport> {
        self.last_report.as_ref()
    }

    //--- Internal Helpers -------------------------------------------------

    fn launch(&mut self, game_id: &str, context: &mut GlobalContext) {
        if self.host.is_open() {
            debug!(target: "desktop", "Modal already open, ignoring {}", game_id);
            return;
        }
        let Some(game) = self.catalog.get(game_id) else {
            warn!(target: "desktop", "Unknown game tile {}", game_id);
            return;
        };

        match context.credits.authorize_launch(game.cost) {
            LaunchDecision::Granted { loaded_credits } => {
                info!(
                    target: "desktop",
                    "Launching {} for {} credits ({} left on terminal)",
                    game.title, game.cost, loaded_credits
                );
                self.credit_prompt = None;
                self.purchase_prompt = None;
                if let Err(e) = self.host.open(game) {
                    context.notify(Notice::GameFailed {
                        game: game.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            LaunchDecision::NeedsTransfer { account_credits } => {
                debug!(
                    target: "desktop",
                    "{} needs {} loaded credits, account holds {}",
                    game.title, game.cost, account_credits
                );
                self.credit_prompt = Some(game.id.clone());
            }
            LaunchDecision::NeedsPurchase { .. } => {
                context.notify(Notice::PurchaseRequired {
                    game: game.title.clone(),
                    cost: game.cost,
                });
                self.purchase_prompt = Some(game.id.clone());
            }
            LaunchDecision::BalancePending => {
                debug!(target: "desktop", "Balance still loading, {} not launched", game.title);
            }
        }
    }

    fn load(&mut self, amount: u64, context: &mut GlobalContext) {
        match context.credits.transfer_to_terminal(amount) {
            Ok(balance) => {
                context.notify(Notice::CreditsLoaded {
                    amount,
                    loaded_credits: balance.loaded_credits,
                });
                self.credit_prompt = None;
            }
            Err(e) => context.notify(Notice::TransferFailed {
                requested: amount,
                reason: e.to_string(),
            }),
        }
    }

    fn close_modal(&mut self) {
        if self.host.is_open() {
            let report = self.host.teardown();
            debug!(target: "desktop", "Game modal closed: {:?}", report);
            self.last_report = Some(report);
        }
    }
}

impl<E: HostEnvironment + 'static> Page<Route> for DesktopPage<E> {
    fn on_enter(&mut self, context: &mut GlobalContext) {
        self.station = context.active_station;
        self.last_report = None;
        context.refresh_credits();
        info!(target: "desktop", "Desktop opened on station {:?}", self.station);
    }

    fn on_exit(&mut self, _context: &mut GlobalContext) {
        self.close_modal();
        self.credit_prompt = None;
        self.purchase_prompt = None;
    }

    fn handle(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        match event {
            CafeEvent::GameTileClicked(id) => self.launch(id, context),
            CafeEvent::LoadCredits(amount) => self.load(*amount, context),
            CafeEvent::LoadAllCredits => self.load(context.credits.account_credits(), context),
            CafeEvent::DismissCreditPrompt => {
                self.credit_prompt = None;
                self.purchase_prompt = None;
            }
            CafeEvent::ConfirmPurchaseFlow => {
                self.purchase_prompt = None;
                context.navigate(Route::Payment);
            }
            CafeEvent::CloseGameModal => self.close_modal(),
            CafeEvent::Key(input) => {
                self.host.dispatch_input(*input);
            }
            CafeEvent::Back => {
                if self.host.is_open() {
                    self.close_modal();
                } else {
                    context.navigate(Route::Cafe);
                }
            }
            _ => return false,
        }
        true
    }

    fn update(&mut self, dt: Duration, context: &mut GlobalContext) {
        for event in self.host.update(dt) {
            match event {
                HostEvent::Ready { session, fallback } => {
                    debug!(target: "desktop", "Session {} ready (fallback: {})", session, fallback);
                }
                HostEvent::Failed { failure, .. } => {
                    let game = self
                        .host
                        .current_game()
                        .map(|g| g.title.clone())
                        .unwrap_or_default();
                    context.notify(Notice::GameFailed {
                        game,
                        reason: failure.to_string(),
                    });
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
