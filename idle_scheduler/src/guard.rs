//! Failure containment around calls into a steppable process.
//!
//! Every call the scheduler makes into a process goes through here:
//! launch, `begin`, `advance`, `is_alive` and `shutdown`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use steppable::{Launcher, StepFault, Steppable};

/// Wraps exactly one call into a steppable process
///
/// An `Err` from the process is passed through unchanged. A panic is
/// caught and converted into a [`StepFault`] with `FaultCause::Panic`.
/// Nothing is retried.
pub struct FrameGuard;

impl FrameGuard {
    /// Runs one `advance` call under containment
    pub fn run(process: &mut dyn Steppable) -> Result<(), StepFault> {
        Self::contain(|| process.advance())
    }

    /// Runs one `is_alive` check under containment
    pub fn alive(process: &dyn Steppable) -> Result<bool, StepFault> {
        Self::contain(|| Ok(process.is_alive()))
    }

    /// Builds a fresh process and calls its `begin`, under containment
    pub fn launch(launcher: &mut Launcher) -> Result<Box<dyn Steppable>, StepFault> {
        Self::contain(|| {
            let mut process = launcher()?;
            process.begin();
            Ok(process)
        })
    }

    /// Runs an arbitrary fallible call under containment
    pub fn contain<R, F>(call: F) -> Result<R, StepFault>
    where
        F: FnOnce() -> Result<R, StepFault>,
    {
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(result) => result,
            Err(payload) => Err(StepFault::panic(panic_message(&payload))),
        }
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
