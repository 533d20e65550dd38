//! # Idle Slot and Hook Chain
//!
//! The host invokes exactly one idle callback per polling iteration.
//! Installing the scheduler swaps that callback out and keeps the old
//! one in a [`HookChain`], which the scheduler calls after its own work.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A zero-argument idle callback whose result is discarded
pub type IdleFn = Box<dyn FnMut()>;

/// The host's idle-callback slot
///
/// Starts out holding a no-op. The host calls [`IdleSlot::invoke`] on
/// every input poll that finds nothing to read.
pub struct IdleSlot {
    occupant: IdleFn,
    invocations: u64,
}

impl IdleSlot {
    /// Creates a slot holding a no-op callback
    pub fn new() -> Self {
        Self::with_callback(Box::new(|| {}))
    }

    /// Creates a slot holding the given callback
    pub fn with_callback(occupant: IdleFn) -> Self {
        Self {
            occupant,
            invocations: 0,
        }
    }

    /// Invokes the current occupant
    pub fn invoke(&mut self) {
        self.invocations += 1;
        (self.occupant)();
    }

    /// Replaces the occupant, returning the previous one
    pub fn replace(&mut self, occupant: IdleFn) -> IdleFn {
        std::mem::replace(&mut self.occupant, occupant)
    }

    /// Number of times the host invoked this slot
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl Default for IdleSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleSlot")
            .field("invocations", &self.invocations)
            .finish_non_exhaustive()
    }
}

/// The idle behavior that existed before installation
///
/// Captured once at installation and never reassigned. Clones share the
/// same captured behavior.
#[derive(Clone)]
pub struct HookChain {
    previous: Rc<RefCell<IdleFn>>,
}

impl HookChain {
    /// Captures the previous idle behavior
    pub fn capture(previous: IdleFn) -> Self {
        Self {
            previous: Rc::new(RefCell::new(previous)),
        }
    }

    /// A chain whose previous behavior does nothing
    pub fn noop() -> Self {
        Self::capture(Box::new(|| {}))
    }

    /// Invokes the captured previous behavior
    ///
    /// A call made from inside the previous behavior itself is dropped.
    pub fn invoke_previous(&self) {
        match self.previous.try_borrow_mut() {
            Ok(mut previous) => (*previous)(),
            Err(_) => log::warn!("re-entrant hook chain call ignored"),
        }
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain").finish_non_exhaustive()
    }
}
