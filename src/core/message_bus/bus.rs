//=========================================================================
// Message Bus
//=========================================================================
//
// Type-safe multi-consumer message queue for page and runtime messages.
//
// Architecture:
//   Pages / Runtime → push<M>() → HashMap<TypeId, Vec<M>>
//                                      ↓
//   Multiple consumers ← read<M>() (shared) or drain<M>() (owned)
//                                      ↓
//   Cafe ───────────────────────→ clear_all() at tick boundary
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::message_queue::MessageQueue;

//=== Public API ==========================================================

/// Marker trait for types that can be sent through the MessageBus.
///
/// Automatically implemented for all types that are Send + 'static.
pub trait Message: Send + 'static {}

impl<T: Send + 'static> Message for T {}

//=========================================================================

/// Type-safe message queue for batched communication within a tick.
///
/// Maintains one queue per message type. Queues keep their allocation
/// across frames.
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    /// Creates a new empty message bus.
    pub fn new() -> Self {
        MessageBus {
            queues: HashMap::new(),
        }
    }

    //--- Message Operations -----------------------------------------------

    /// Pushes a message into the queue for its type.
    pub fn push<M: Message>(&mut self, msg: M) {
        if let Some(queue) = self.queue_mut::<M>() {
            queue.push(msg);
        }
    }

    /// Returns all messages of type M currently queued.
    ///
    /// Several consumers may read the same messages in one frame.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queue::<M>().map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Removes and returns all messages of type M, keeping the queue allocation.
    pub fn drain<M: Message>(&mut self) -> Vec<M> {
        match self.queues.get_mut(&TypeId::of::<M>()) {
            Some(queue) => queue
                .as_any_mut()
                .downcast_mut::<Vec<M>>()
                .map(|v| v.drain(..).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    //--- Query API --------------------------------------------------------

    /// Returns true if there are any messages of type M queued.
    pub fn has_messages<M: Message>(&self) -> bool {
        self.queue::<M>().map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Returns the number of messages of type M currently queued.
    pub fn count<M: Message>(&self) -> usize {
        self.queue::<M>().map(|v| v.len()).unwrap_or(0)
    }

    /// Clears all messages of type M, preserving allocated capacity.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queues.get_mut(&TypeId::of::<M>()) {
            queue.clear_queue();
        }
    }

    /// Clears all queues for all message types, preserving capacity.
    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }

    /// Total number of queued messages across all types.
    pub fn total(&self) -> usize {
        self.queues.values().map(|q| q.len()).sum()
    }

    //--- Internal Helpers -------------------------------------------------

    fn queue<M: Message>(&self) -> Option<&Vec<M>> {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<M>>())
    }

    fn queue_mut<M: Message>(&mut self) -> Option<&mut Vec<M>> {
        self.queues
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()))
            .as_any_mut()
            .downcast_mut::<Vec<M>>()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
