//! Scheduler Test Utilities
//!
//! Shared collaborators for the scheduler integration tests.
//!
//! ## Test Philosophy
//!
//! - **Count everything**: Every collaborator call is counted so tests can
//!   assert exact call counts per idle invocation
//! - **Faults on demand**: Processes fail or end themselves at a chosen frame
//! - **One thread**: No timing, no sleeping; the sim tick source never blocks

use idle_scheduler::{IdleSlot, Scheduler, SchedulerHandle, StepFault, Steppable};
use std::cell::Cell;
use std::rc::Rc;
use tick_source::SimTickSource;

/// Shared counters and switches for a [`CountingProcess`]
#[derive(Debug, Default)]
pub struct ProcessLog {
    pub launches: Cell<u32>,
    pub begins: Cell<u32>,
    pub advances: Cell<u32>,
    pub shutdowns: Cell<u32>,
    pub alive: Cell<bool>,
    /// Advance number (1-based) that returns an error
    pub fail_on: Cell<Option<u32>>,
    /// Advance number (1-based) that panics
    pub panic_on: Cell<Option<u32>>,
    /// Advance number after which the process ends itself
    pub end_after: Cell<Option<u32>>,
    pub liveness_checks: Cell<u32>,
    /// Liveness check number (1-based) that panics
    pub liveness_panic_on: Cell<Option<u32>>,
    /// Launches are refused with an error while set
    pub refuse_launch: Cell<bool>,
    /// `begin` panics while set
    pub panic_on_begin: Cell<bool>,
}

/// A steppable process reporting into a [`ProcessLog`]
pub struct CountingProcess(Rc<ProcessLog>);

impl Steppable for CountingProcess {
    fn begin(&mut self) {
        self.0.begins.set(self.0.begins.get() + 1);
        if self.0.panic_on_begin.get() {
            panic!("process panicked in begin");
        }
        self.0.alive.set(true);
    }

    fn advance(&mut self) -> Result<(), StepFault> {
        let n = self.0.advances.get() + 1;
        self.0.advances.set(n);

        if self.0.panic_on.get() == Some(n) {
            panic!("process panicked on advance {}", n);
        }
        if self.0.fail_on.get() == Some(n) {
            return Err(StepFault::error(format!("process failed on advance {}", n)));
        }
        if self.0.end_after.get() == Some(n) {
            self.0.alive.set(false);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        let n = self.0.liveness_checks.get() + 1;
        self.0.liveness_checks.set(n);
        if self.0.liveness_panic_on.get() == Some(n) {
            panic!("process panicked on liveness check {}", n);
        }
        self.0.alive.get()
    }

    fn shutdown(&mut self) {
        self.0.shutdowns.set(self.0.shutdowns.get() + 1);
        self.0.alive.set(false);
    }
}

/// An installed scheduler plus everything a test needs to observe it
pub struct Harness {
    pub slot: IdleSlot,
    pub handle: SchedulerHandle<SimTickSource>,
    pub process: Rc<ProcessLog>,
    /// Invocations of the idle behavior that existed before installation
    pub chained: Rc<Cell<u32>>,
}

impl Harness {
    /// Installs a scheduler over a counting idle callback
    pub fn new() -> Self {
        let process = Rc::new(ProcessLog::default());
        let chained = Rc::new(Cell::new(0));

        let counter = Rc::clone(&chained);
        let mut slot = IdleSlot::with_callback(Box::new(move || counter.set(counter.get() + 1)));

        let launch_log = Rc::clone(&process);
        let handle = SchedulerHandle::install(&mut slot, move |hooks| {
            Scheduler::new(
                hooks,
                Box::new(move || {
                    launch_log.launches.set(launch_log.launches.get() + 1);
                    if launch_log.refuse_launch.get() {
                        return Err(StepFault::error("launch refused"));
                    }
                    Ok(Box::new(CountingProcess(Rc::clone(&launch_log))) as Box<dyn Steppable>)
                }),
                SimTickSource::new(),
            )
        });

        Self {
            slot,
            handle,
            process,
            chained,
        }
    }

    /// Invokes the host idle slot `count` times
    pub fn idle(&mut self, count: usize) {
        for _ in 0..count {
            self.slot.invoke();
        }
    }

    pub fn arm_calls(&self) -> u64 {
        self.handle.scheduler().ticks().arm_calls()
    }

    pub fn disarm_calls(&self) -> u64 {
        self.handle.scheduler().ticks().disarm_calls()
    }

    pub fn wait_calls(&self) -> u64 {
        self.handle.scheduler().ticks().wait_calls()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
