//=========================================================================
// Message Bus
//=========================================================================
//
// Typed per-frame queues shared by pages and the café runtime.
//
// Carries page transitions and user-visible notices. Producers push
// during a tick; the runtime consumes and clears at the tick boundary.
//
//=========================================================================

//=== Module Declarations =================================================

mod bus;
mod message_queue;

//=== Public API ==========================================================

pub use bus::{Message, MessageBus};
