//=========================================================================
// Café Pages
//=========================================================================
//
// The screens a visitor moves through, each registered once in the
// PageManager under its Route.
//
// Flow:
//   Door → Cafe floor → Desktop(station) → game modal
//                     → Payment (via the cashier)
//                     → Leaderboard (via the kiosk)
//   Login / Register / Dashboard are reachable by direct navigation.
//
//=========================================================================

//=== Module Declarations =================================================

mod cafe_floor;
mod desktop;
mod door;
mod info;
mod leaderboard;
mod payment;

//=== Public API ==========================================================

pub use cafe_floor::CafeFloorPage;
pub use desktop::{DesktopPage, LOAD_OPTIONS};
pub use door::DoorPage;
pub use info::{InfoKind, InfoPage};
pub use leaderboard::{LeaderboardEntry, LeaderboardPage};
pub use payment::PaymentPage;

//=== Internal Dependencies ===============================================

use crate::core::page::PageKey;

//=== Route ===============================================================

/// Page identifiers, one per address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Door,
    Cafe,
    Login,
    Register,
    Dashboard,
    Payment,
    Leaderboard,
    Desktop,
}

impl PageKey for Route {}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Door,
        Route::Cafe,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Payment,
        Route::Leaderboard,
        Route::Desktop,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Door => "/",
            Self::Cafe => "/cybercafe",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Payment => "/payment",
            Self::Leaderboard => "/leaderboard",
            Self::Desktop => "/desktop",
        }
    }

    /// Resolves an address; a trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Self::ALL.into_iter().find(|route| route.path() == trimmed)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
