//! # Scheduler Handle
//!
//! Shares the one scheduler between the host's idle slot and its
//! command surface. Everything runs on the host's single thread, so the
//! handle is an `Rc<RefCell<_>>` rather than anything thread-safe.
//!
//! The handle's idle callback steps the scheduler and releases its borrow
//! before invoking the hook chain, so the previous idle behavior may query
//! or drive the handle.

use crate::hook::{HookChain, IdleFn, IdleSlot};
use crate::scheduler::{RunId, Scheduler, SchedulerError, SchedulerState};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tick_source::TickSource;

/// Shared handle to an installed scheduler
pub struct SchedulerHandle<T: TickSource> {
    inner: Rc<RefCell<Scheduler<T>>>,
    hooks: HookChain,
}

impl<T: TickSource + 'static> SchedulerHandle<T> {
    /// Installs a scheduler in the host's idle slot
    ///
    /// The slot's current occupant becomes the scheduler's hook chain and
    /// the scheduler's `on_idle` takes its place. `build` receives the
    /// captured chain and returns the scheduler that owns it.
    pub fn install<F>(slot: &mut IdleSlot, build: F) -> Self
    where
        F: FnOnce(HookChain) -> Scheduler<T>,
    {
        let previous = slot.replace(Box::new(|| {}));
        let hooks = HookChain::capture(previous);
        let handle = Self {
            inner: Rc::new(RefCell::new(build(hooks.clone()))),
            hooks,
        };
        slot.replace(handle.idle_callback());
        log::debug!("idle scheduler installed");
        handle
    }

    /// Builds the callback placed in the idle slot
    ///
    /// An idle call that arrives while the scheduler is borrowed (from
    /// inside a frame, or from a command in progress) runs no frame. The
    /// hook chain is still invoked once for it.
    fn idle_callback(&self) -> IdleFn {
        let handle = self.clone();
        Box::new(move || handle.on_idle())
    }
}

impl<T: TickSource> SchedulerHandle<T> {
    /// See [`Scheduler::start`]
    pub fn start(&self) -> Result<RunId, SchedulerError> {
        self.inner.borrow_mut().start()
    }

    /// See [`Scheduler::stop`]
    pub fn stop(&self) -> Result<(), SchedulerError> {
        self.inner.borrow_mut().stop()
    }

    /// See [`Scheduler::toggle`]
    pub fn toggle(&self) -> SchedulerState {
        self.inner.borrow_mut().toggle()
    }

    /// See [`Scheduler::on_idle`]
    ///
    /// Steps the scheduler, then invokes the hook chain with the scheduler
    /// no longer borrowed.
    pub fn on_idle(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut scheduler) => scheduler.step(),
            Err(_) => log::warn!("re-entrant idle call: no frame run"),
        }
        self.hooks.invoke_previous();
    }

    /// Returns the current state
    pub fn state(&self) -> SchedulerState {
        self.inner.borrow().state()
    }

    /// Borrows the scheduler for inspection
    pub fn scheduler(&self) -> Ref<'_, Scheduler<T>> {
        self.inner.borrow()
    }
}

impl<T: TickSource> Clone for SchedulerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            hooks: self.hooks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use steppable::{StepFault, Steppable};
    use tick_source::SimTickSource;

    struct Forever;

    impl Steppable for Forever {
        fn begin(&mut self) {}

        fn advance(&mut self) -> Result<(), StepFault> {
            Ok(())
        }

        fn is_alive(&self) -> bool {
            true
        }
    }

    fn install(slot: &mut IdleSlot) -> SchedulerHandle<SimTickSource> {
        SchedulerHandle::install(slot, |hooks| {
            Scheduler::new(
                hooks,
                Box::new(|| Ok(Box::new(Forever) as Box<dyn Steppable>)),
                SimTickSource::new(),
            )
        })
    }

    #[test]
    fn test_install_chains_previous_occupant() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut slot = IdleSlot::with_callback(Box::new(move || counter.set(counter.get() + 1)));

        let handle = install(&mut slot);
        slot.invoke();
        slot.invoke();

        assert_eq!(hits.get(), 2);
        assert_eq!(handle.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_slot_drives_frames_once_started() {
        let mut slot = IdleSlot::new();
        let handle = install(&mut slot);

        handle.start().unwrap();
        slot.invoke();
        slot.invoke();
        slot.invoke();

        assert_eq!(handle.scheduler().frames(), 3);
        assert_eq!(handle.scheduler().ticks().wait_calls(), 3);
    }

    #[test]
    fn test_start_stop_do_not_reinstall() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut slot = IdleSlot::with_callback(Box::new(move || counter.set(counter.get() + 1)));
        let handle = install(&mut slot);

        handle.start().unwrap();
        handle.stop().unwrap();
        handle.toggle();
        handle.toggle();
        slot.invoke();

        // Still exactly one layer of chaining
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_reentrant_idle_runs_no_frame_but_chains() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut slot = IdleSlot::with_callback(Box::new(move || counter.set(counter.get() + 1)));
        let handle = install(&mut slot);
        handle.start().unwrap();
        let mut callback = handle.idle_callback();

        {
            let _guard = handle.inner.borrow_mut();
            callback();
        }

        assert_eq!(hits.get(), 1);
        assert_eq!(handle.state(), SchedulerState::Running);
        assert_eq!(handle.scheduler().frames(), 0);
        assert_eq!(handle.scheduler().ticks().wait_calls(), 0);
    }

    #[test]
    fn test_previous_behavior_may_query_handle() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let late: Rc<RefCell<Option<SchedulerHandle<SimTickSource>>>> =
            Rc::new(RefCell::new(None));
        let (record, lookup) = (seen.clone(), late.clone());
        let mut slot = IdleSlot::with_callback(Box::new(move || {
            if let Some(handle) = lookup.borrow().as_ref() {
                record.borrow_mut().push(handle.state());
            }
        }));
        let handle = install(&mut slot);
        *late.borrow_mut() = Some(handle.clone());

        slot.invoke();
        handle.start().unwrap();
        slot.invoke();

        assert_eq!(
            seen.borrow().as_slice(),
            &[SchedulerState::Stopped, SchedulerState::Running]
        );
        assert_eq!(handle.scheduler().frames(), 1);
        late.borrow_mut().take();
    }

    #[test]
    fn test_clones_share_state() {
        let mut slot = IdleSlot::new();
        let handle = install(&mut slot);
        let other = handle.clone();

        let run_id = handle.start().unwrap();
        assert_eq!(other.state(), SchedulerState::Running);
        assert_eq!(other.start(), Err(SchedulerError::AlreadyRunning(run_id)));
    }
}
