//! # Tick Source
//!
//! Pacing abstraction for frame-stepped processes.
//!
//! ## Philosophy
//!
//! **Timing policy lives outside the scheduler.**
//!
//! A tick source only answers three requests:
//! - Arm the ticking
//! - Block until the next tick
//! - Disarm the ticking
//!
//! The frame rate is a property of the source, so swapping the source
//! changes pacing without touching the code that steps the process.
//!
//! ## Implementations
//!
//! - [`IntervalTicker`]: wall-clock pacing with `std::time`
//! - [`SimTickSource`]: deterministic, call-counting source for tests

pub mod interval;
pub mod sim;

pub use interval::IntervalTicker;
pub use sim::SimTickSource;

use thiserror::Error;

/// Tick source construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickSourceError {
    #[error("Tick interval must be non-zero")]
    ZeroInterval,

    #[error("Tick rate must be non-zero")]
    ZeroRate,
}

/// Periodic tick facility used for frame pacing
///
/// # Implementation Notes
///
/// - `wait_next_tick` must never block longer than one configured interval
/// - Waiting while disarmed must return immediately
/// - `arm` on an armed source restarts the period
pub trait TickSource {
    /// Starts the periodic ticking
    fn arm(&mut self);

    /// Stops the periodic ticking
    fn disarm(&mut self);

    /// Blocks the current control flow until the next tick fires
    fn wait_next_tick(&mut self);

    /// Returns true while the source is armed
    fn is_armed(&self) -> bool;
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn arm(&mut self) {
        (**self).arm()
    }

    fn disarm(&mut self) {
        (**self).disarm()
    }

    fn wait_next_tick(&mut self) {
        (**self).wait_next_tick()
    }

    fn is_armed(&self) -> bool {
        (**self).is_armed()
    }
}
