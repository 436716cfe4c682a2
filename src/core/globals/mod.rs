//=========================================================================
// Global Runtime State
//=========================================================================
//
// Separates systems (logic components) from context (shared data).
//
// Architecture:
//   GlobalSystems: PageManager (owned by the café runtime)
//   GlobalContext: MessageBus + CreditsSession + identity (passed to pages)
//
//=========================================================================

//=== Module Declarations =================================================

mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use global_context::GlobalContext;
pub use global_systems::GlobalSystems;
