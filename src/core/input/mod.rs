//=========================================================================
// Input
//=========================================================================
//
// Key events delivered to embedded games through the host.
//
// Flow:
//   CafeEvent::Key(GameInput) → Desktop page → GameHost::dispatch_input
//                                                  ↓
//                              listeners registered by the mounted game
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;

//=== Public API ==========================================================

pub use event::{GameInput, KeyCode, ListenerKind};
