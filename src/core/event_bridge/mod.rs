//=========================================================================
// Event Bridge
//=========================================================================
//
// Bridges the presentation layer with the café runtime.
//
// Components:
// - `interface`: the event contract
// - `event_collector`: runtime-side event collection per tick
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use event_collector::EventCollector;
pub use event_collector::TickControl;
pub use interface::CafeEvent;
