//! Wall-clock interval ticker.

use crate::{TickSource, TickSourceError};
use std::thread;
use std::time::{Duration, Instant};

/// Paces frames against a fixed wall-clock interval
///
/// Deadlines are absolute, so the time a frame spends working is
/// subtracted from the following wait. A frame that overruns its
/// deadline does not sleep at all and the schedule is re-anchored
/// one interval from now, so late frames never burst to catch up.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: Duration,
    next_deadline: Option<Instant>,
    ticks: u64,
}

impl IntervalTicker {
    /// Creates a ticker with the given interval
    pub fn new(interval: Duration) -> Result<Self, TickSourceError> {
        if interval.is_zero() {
            return Err(TickSourceError::ZeroInterval);
        }

        Ok(Self {
            interval,
            next_deadline: None,
            ticks: 0,
        })
    }

    /// Creates a ticker firing `hz` times per second
    pub fn from_rate(hz: u32) -> Result<Self, TickSourceError> {
        if hz == 0 {
            return Err(TickSourceError::ZeroRate);
        }
        Self::new(Duration::from_secs(1) / hz)
    }

    /// Returns the configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of ticks waited on since the last arm
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the next scheduled deadline, if armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }
}

impl TickSource for IntervalTicker {
    fn arm(&mut self) {
        self.next_deadline = Some(Instant::now() + self.interval);
        self.ticks = 0;
        log::debug!("interval ticker armed ({:?})", self.interval);
    }

    fn disarm(&mut self) {
        if self.next_deadline.take().is_some() {
            log::debug!("interval ticker disarmed after {} ticks", self.ticks);
        }
    }

    fn wait_next_tick(&mut self) {
        let Some(deadline) = self.next_deadline else {
            log::debug!("wait_next_tick on a disarmed ticker");
            return;
        };

        let now = Instant::now();
        if deadline > now {
            // Never longer than one interval: the deadline is at most now + interval.
            thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.interval);
        } else {
            log::trace!("frame overran tick deadline by {:?}", now - deadline);
            self.next_deadline = Some(now + self.interval);
        }
        self.ticks += 1;
    }

    fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }
}
