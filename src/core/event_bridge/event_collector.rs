//=========================================================================
// Event Collector
//=========================================================================
//
// Café event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<CafeEvent> → collect_frame() → events → TickControl
//
// Bounded polling prevents starvation.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::CafeEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

const MAX_EVENTS_PER_FRAME: usize = 100;

/// Collects pending events for one frame.
pub(crate) struct EventCollector {
    receiver: Receiver<CafeEvent>,
    events: Vec<CafeEvent>,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<CafeEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(8),
        }
    }

    /// Collects pending events, bounded per frame.
    ///
    /// Events queued before a `Shutdown` are still collected.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();
        let mut drained = 0;

        while drained < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(CafeEvent::Shutdown) => return TickControl::Exit,
                Ok(event) => {
                    self.events.push(event);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_EVENTS_PER_FRAME {
            warn!(target: "cafe", "Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    /// Takes the collected events, leaving an empty buffer.
    pub(crate) fn take_events(&mut self) -> Vec<CafeEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
