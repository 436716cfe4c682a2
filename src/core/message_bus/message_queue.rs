//=========================================================================
// Message Queue Trait
//=========================================================================
//
// Type-erased view over `Vec<M>` so the bus can store one queue per
// message type in a single map.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use super::Message;

//=========================================================================

/// Type-erased queue storage used by [`super::MessageBus`].
pub(super) trait MessageQueue: Send {
    /// Clears all messages while preserving allocated capacity.
    fn clear_queue(&mut self);

    fn len(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: Message> MessageQueue for Vec<M> {
    fn clear_queue(&mut self) {
        self.clear();
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_queue_clears_without_reallocating() {
        let mut queue: Vec<u64> = Vec::with_capacity(16);
        queue.extend([100, 250, 500]);
        let capacity = queue.capacity();

        let erased: &mut dyn MessageQueue = &mut queue;
        assert_eq!(erased.len(), 3);
        erased.clear_queue();

        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), capacity);
    }

    #[test]
    fn erased_queue_downcasts_to_concrete_vec() {
        let mut queue: Vec<String> = vec!["pacman".to_string()];
        let erased: &mut dyn MessageQueue = &mut queue;

        assert!(erased.as_any().downcast_ref::<Vec<u64>>().is_none());
        if let Some(inner) = erased.as_any_mut().downcast_mut::<Vec<String>>() {
            inner.push("tetris".to_string());
        }

        assert_eq!(queue, vec!["pacman", "tetris"]);
    }
}
