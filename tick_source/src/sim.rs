//! # Simulated Tick Source
//!
//! Deterministic tick source for testing.
//!
//! Unlike a wall-clock ticker, this source never sleeps. Each wait
//! while armed advances a monotonic tick counter by exactly one, and
//! every request is counted so tests can assert on pacing behavior.

use crate::TickSource;

/// Simulated tick source with call accounting
///
/// # Examples
///
/// ```
/// use tick_source::{SimTickSource, TickSource};
///
/// let mut ticks = SimTickSource::new();
/// ticks.arm();
/// ticks.wait_next_tick();
/// ticks.wait_next_tick();
/// assert_eq!(ticks.current_tick(), 2);
/// assert_eq!(ticks.wait_calls(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimTickSource {
    armed: bool,
    tick: u64,
    arm_calls: u64,
    disarm_calls: u64,
    wait_calls: u64,
}

impl SimTickSource {
    /// Creates a disarmed source at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current tick count
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Number of `arm` requests received
    pub fn arm_calls(&self) -> u64 {
        self.arm_calls
    }

    /// Number of `disarm` requests received
    pub fn disarm_calls(&self) -> u64 {
        self.disarm_calls
    }

    /// Number of `wait_next_tick` requests received
    pub fn wait_calls(&self) -> u64 {
        self.wait_calls
    }
}

impl TickSource for SimTickSource {
    fn arm(&mut self) {
        self.armed = true;
        self.arm_calls += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.disarm_calls += 1;
    }

    fn wait_next_tick(&mut self) {
        self.wait_calls += 1;
        if self.armed {
            self.tick = self.tick.checked_add(1).expect("Tick counter overflow");
        }
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_source_is_disarmed_at_zero() {
        let source = SimTickSource::new();
        assert!(!source.is_armed());
        assert_eq!(source.current_tick(), 0);
        assert_eq!(source.arm_calls(), 0);
    }

    #[test]
    fn test_waits_advance_only_while_armed() {
        let mut source = SimTickSource::new();
        source.wait_next_tick();
        assert_eq!(source.current_tick(), 0);

        source.arm();
        source.wait_next_tick();
        source.wait_next_tick();
        assert_eq!(source.current_tick(), 2);

        source.disarm();
        source.wait_next_tick();
        assert_eq!(source.current_tick(), 2);
        assert_eq!(source.wait_calls(), 4);
    }

    #[test]
    fn test_call_accounting() {
        let mut source = SimTickSource::new();
        source.arm();
        source.disarm();
        source.arm();
        assert_eq!(source.arm_calls(), 2);
        assert_eq!(source.disarm_calls(), 1);
        assert!(source.is_armed());
    }

    #[test]
    fn test_deterministic_sequence() {
        let mut a = SimTickSource::new();
        let mut b = SimTickSource::new();
        a.arm();
        b.arm();
        for _ in 0..7 {
            a.wait_next_tick();
            b.wait_next_tick();
        }
        assert_eq!(a.current_tick(), b.current_tick());
        assert_eq!(a.current_tick(), 7);
    }
}
