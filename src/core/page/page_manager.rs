//=========================================================================
// Page Manager
//=========================================================================
//
// Manages page registration, stack operations, and lifecycle.
//
// Pages are stored in a HashMap by key and referenced via a stack of
// keys. This allows pages to keep state between activations.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Page;
use crate::core::event_bridge::CafeEvent;
use crate::core::globals::GlobalContext;

//=== Page Transition =====================================================

/// Page stack operations, published on the message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTransition<K: PageKey> {
    /// Adds a page to the top of the stack.
    Push(K),

    /// Removes a specific page from the stack.
    Remove(K),

    /// Replaces a page in place.
    Replace(K, K),

    /// Clears the whole stack.
    Clear,

    /// No transition occurs.
    Empty,
}

impl<K: PageKey> Default for PageTransition<K> {
    fn default() -> Self {
        Self::Empty
    }
}

//=== Page Key Trait ======================================================

/// Marker trait for page identifiers.
pub trait PageKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== Page Manager ========================================================

/// Rounds of transitions applied per tick; lifecycle hooks may queue more.
const MAX_TRANSITION_ROUNDS: usize = 8;

pub struct PageManager<R: PageKey> {
    pages: HashMap<R, Box<dyn Page<R>>>,
    stack: Vec<R>,
}

impl<R: PageKey> PageManager<R> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            stack: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a page. Pages must be registered before being pushed.
    pub fn register_page<T>(&mut self, key: R, page: T)
    where
        T: Page<R> + 'static,
    {
        if self.pages.insert(key, Box::new(page)).is_some() {
            warn!(target: "pages", "Page {:?} was already registered and has been replaced", key);
        }
    }

    /// Registers a page and places it on the stack as the starting page.
    ///
    /// `on_enter` runs when [`Self::start`] is called.
    pub fn register_default<T>(&mut self, key: R, page: T)
    where
        T: Page<R> + 'static,
    {
        self.register_page(key, page);

        if self.stack.contains(&key) {
            warn!(target: "pages", "Page {:?} is already in the stack", key);
        } else {
            debug!(target: "pages", "Registered page {:?} as default", key);
            self.stack.push(key);
        }
    }

    /// Enters the initial page.
    pub fn start(&mut self, context: &mut GlobalContext) {
        if let Some(&initial) = self.stack.first() {
            debug!(target: "pages", "Starting with page {:?}", initial);
            if let Some(page) = self.pages.get_mut(&initial) {
                page.on_enter(context);
            } else {
                warn!(target: "pages", "Initial page {:?} not registered", initial);
            }
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn top(&self) -> Option<R> {
        self.stack.last().copied()
    }

    pub fn stack(&self) -> &[R] {
        &self.stack
    }

    pub fn is_active(&self, key: R) -> bool {
        self.stack.contains(&key)
    }

    /// Typed access to a registered page.
    pub fn page<T: 'static>(&self, key: R) -> Option<&T> {
        self.pages.get(&key)?.as_any().downcast_ref::<T>()
    }

    //--- Event Dispatch ---------------------------------------------------

    /// Delivers `event` to the top page.
    pub fn dispatch(&mut self, event: &CafeEvent, context: &mut GlobalContext) -> bool {
        let Some(top) = self.top() else {
            return false;
        };
        match self.pages.get_mut(&top) {
            Some(page) => page.handle(event, context),
            None => false,
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Updates the top page. Covered pages are paused.
    pub fn update(&mut self, dt: Duration, context: &mut GlobalContext) {
        let Some(top) = self.top() else {
            return;
        };
        if let Some(page) = self.pages.get_mut(&top) {
            page.update(dt, context);
        }
    }

    //--- Transition Processing --------------------------------------------

    /// Applies queued transitions in FIFO order with lifecycle callbacks.
    ///
    /// Transitions queued by `on_enter` / `on_exit` are applied in the
    /// same call.
    pub fn process_transitions(&mut self, context: &mut GlobalContext) {
        for _ in 0..MAX_TRANSITION_ROUNDS {
            let transitions = context.message_bus.drain::<PageTransition<R>>();
            if transitions.is_empty() {
                return;
            }
            for transition in transitions {
                match transition {
                    PageTransition::Push(key) => self.push_internal(key, context),
                    PageTransition::Remove(key) => self.remove_internal(key, context),
                    PageTransition::Replace(old_key, new_key) => {
                        self.replace_internal(old_key, new_key, context)
                    }
                    PageTransition::Clear => self.clear_internal(context),
                    PageTransition::Empty => {}
                }
            }
        }
        warn!(target: "pages", "Page transitions still queued after {} rounds", MAX_TRANSITION_ROUNDS);
    }

    /// Exits every page on the stack.
    pub fn shutdown(&mut self, context: &mut GlobalContext) {
        self.clear_internal(context);
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_internal(&mut self, key: R, context: &mut GlobalContext) {
        if self.stack.contains(&key) {
            warn!(target: "pages", "Page {:?} is already in the stack, skipping push", key);
            return;
        }
        let Some(page) = self.pages.get_mut(&key) else {
            warn!(target: "pages", "Attempted to push unregistered page {:?}", key);
            return;
        };

        debug!(target: "pages", "Pushing page {:?}", key);
        self.stack.push(key);
        page.on_enter(context);
    }

    fn remove_internal(&mut self, key: R, context: &mut GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == key) else {
            debug!(target: "pages", "Page {:?} not in stack, skipping removal", key);
            return;
        };

        debug!(target: "pages", "Removing page {:?} at position {}", key, pos);
        self.stack.remove(pos);
        if let Some(page) = self.pages.get_mut(&key) {
            page.on_exit(context);
        }
    }

    fn replace_internal(&mut self, old_key: R, new_key: R, context: &mut GlobalContext) {
        let Some(pos) = self.stack.iter().position(|&k| k == old_key) else {
            warn!(target: "pages", "Page {:?} not in stack, skipping replacement", old_key);
            return;
        };
        if self.stack.contains(&new_key) {
            warn!(target: "pages", "Page {:?} is already in the stack, skipping replacement", new_key);
            return;
        }
        if !self.pages.contains_key(&new_key) {
            warn!(target: "pages", "Attempted to replace with unregistered page {:?}", new_key);
            return;
        }

        debug!(target: "pages", "Replacing page {:?} with {:?}", old_key, new_key);
        if let Some(page) = self.pages.get_mut(&old_key) {
            page.on_exit(context);
        }
        self.stack[pos] = new_key;
        if let Some(page) = self.pages.get_mut(&new_key) {
            page.on_enter(context);
        }
    }

    fn clear_internal(&mut self, context: &mut GlobalContext) {
        debug!(target: "pages", "Clearing page stack");

        // Top first, so overlays exit before what they cover
        for key in self.stack.drain(..).rev() {
            if let Some(page) = self.pages.get_mut(&key) {
                page.on_exit(context);
            }
        }
    }
}

impl<R: PageKey> Default for PageManager<R> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
