//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use cybercafe_sim::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::cafe::{Cafe, CafeBuilder};
pub use crate::core::config::CafeConfig;
pub use crate::core::event_bridge::{CafeEvent, TickControl};
pub use crate::pages::Route;

// Global context
pub use crate::core::globals::GlobalContext;
pub use crate::core::notice::Notice;

// Credits and identity
pub use crate::core::credits::{CreditsApi, CreditsBalance, HttpCreditsClient, InMemoryCredits};
pub use crate::core::identity::{IdentityProvider, StaticIdentity};

// Game host
pub use crate::core::game_host::{GameCatalog, HeadlessEnvironment, HostEnvironment, SlotState};
pub use crate::core::input::{GameInput, KeyCode};

// Page system
pub use crate::core::page::{Page, PageKey, PageTransition};
