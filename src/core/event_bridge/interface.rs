//=========================================================================
// Event Bridge Interface
//=========================================================================
//
// Events sent from the presentation layer (or a test driver) to the café
// runtime over its bounded channel.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;

//=== Internal Dependencies ===============================================

use crate::core::input::GameInput;
use crate::core::interaction::StationId;
use crate::pages::Route;

//=== CafeEvent ===========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CafeEvent {
    //--- Door -------------------------------------------------------------
    DoorClicked,

    //--- Café floor -------------------------------------------------------
    StationClicked(StationId),
    CashierClicked,
    /// "Pay" button on the cashier bubble.
    CashierPayment,
    LeaderboardClicked,
    /// Manual orbit input; ignored while a transition animates.
    FreeLook { translate: Vec3, look_delta: Vec3 },
    ClearCameraTarget,

    //--- Desktop ----------------------------------------------------------
    GameTileClicked(String),
    CloseGameModal,
    LoadCredits(u64),
    LoadAllCredits,
    DismissCreditPrompt,
    /// Accepts the "go to cashier" prompt.
    ConfirmPurchaseFlow,
    Key(GameInput),

    //--- Payment / Leaderboard --------------------------------------------
    PurchaseCredits(u64),
    FilterLeaderboard(Option<String>),

    //--- Runtime ----------------------------------------------------------
    Back,
    /// Identity provider signed someone in or out.
    IdentityChanged,
    /// Direct route change, e.g. from the address bar.
    Navigate(Route),
    Shutdown,
}
