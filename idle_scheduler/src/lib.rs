//! # Idle-Hook Scheduler
//!
//! Runs one frame-stepped process inside a host's blocking input loop.
//!
//! ## Philosophy
//!
//! - **Borrow the host's idle time**: The host already calls an idle callback
//!   on every polling iteration. We take that slot, step the process once
//!   per call, and always hand control back to whatever was there before.
//! - **One thread, no preemption**: Cancellation takes effect on the next
//!   idle call. Nothing here spawns a thread.
//! - **Faults stay inside**: A failing or panicking call into the process
//!   (launch, frame, liveness check, shutdown) stops or refuses the run;
//!   it never reaches the host's idle loop.
//!
//! ## Control Flow
//!
//! ```text
//! host idle poll -> SchedulerHandle::on_idle()
//!     Scheduler::step()
//!         [Running] FrameGuard(is_alive, advance) -> TickSource::wait_next_tick
//!     (scheduler borrow released)
//!     always    HookChain::invoke_previous
//! ```
//!
//! ## State Machine
//!
//! ```text
//! Stopped --start()-------------------> Running
//! Stopped --start(): launch failed-----> Stopped
//! Running --stop()--------------------> Stopped
//! Running --on_idle(): fault----------> Stopped
//! Running --on_idle(): self-ended-----> Stopped
//! ```

pub mod guard;
pub mod handle;
pub mod hook;
pub mod report;
pub mod scheduler;

pub use guard::FrameGuard;
pub use handle::SchedulerHandle;
pub use hook::{HookChain, IdleFn, IdleSlot};
pub use report::{LogReporter, Reporter};
pub use scheduler::{
    RunId, Scheduler, SchedulerError, SchedulerEvent, SchedulerState, DEFAULT_AUDIT_CAPACITY,
};

pub use steppable::{FaultCause, Launcher, StepFault, Steppable};
pub use tick_source::TickSource;
