//! # Steppable Processes
//!
//! The capability a frame-stepped process exposes to whatever drives it.
//!
//! ## Philosophy
//!
//! - **Opaque work**: The driver never inspects what a frame does
//! - **Explicit faults**: A failed frame returns a value, it does not unwind
//! - **Self-owned lifetime**: A process may end itself; the driver only observes it
//!
//! ## Lifecycle
//!
//! ```text
//! begin() -> advance()* -> [is_alive() == false | shutdown()]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What kind of failure ended a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultCause {
    /// The frame returned an error
    Error,
    /// The frame panicked
    Panic,
}

impl fmt::Display for FaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCause::Error => write!(f, "error"),
            FaultCause::Panic => write!(f, "panic"),
        }
    }
}

/// A structured frame failure (cause + human-readable message)
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{cause}: {message}")]
pub struct StepFault {
    pub cause: FaultCause,
    pub message: String,
}

impl StepFault {
    /// Creates a fault reported by the process itself
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            cause: FaultCause::Error,
            message: message.into(),
        }
    }

    /// Creates a fault from a caught panic
    pub fn panic(message: impl Into<String>) -> Self {
        Self {
            cause: FaultCause::Panic,
            message: message.into(),
        }
    }
}

/// A stateful process advanced one unit of work at a time
///
/// # Implementation Notes
///
/// - `advance` performs exactly one frame and must return promptly
/// - `is_alive` turns false when the process ends itself
/// - `shutdown` is only called on a live process, at most once per run
pub trait Steppable {
    /// Marks the process alive and ready for its first frame
    fn begin(&mut self);

    /// Advances the process by one frame
    fn advance(&mut self) -> Result<(), StepFault>;

    /// Returns true until the process has ended
    fn is_alive(&self) -> bool;

    /// Performs the process's own cleanup when stopped from outside
    fn shutdown(&mut self) {}

    /// Optional human-readable status snapshot
    fn describe(&self) -> Option<String> {
        None
    }
}

/// Produces a fresh process for each run
///
/// Returns an error when the process cannot be built, for instance from a
/// configuration that does not describe a valid process.
pub type Launcher = Box<dyn FnMut() -> Result<Box<dyn Steppable>, StepFault>>;
