//! # Scheduler
//!
//! The run/stop state machine driven from the host's idle callback.
//!
//! ## Invariants
//!
//! - `Running` implies an armed tick source and an active process
//! - `Stopped` implies `on_idle` is a pure passthrough to the hook chain
//! - The hook chain runs exactly once per `on_idle`, whatever happened before it
//! - Cleanup runs through [`Scheduler::retire`] only, which takes the process
//!   out of the scheduler first, so it can never run twice for one run
//! - Every call into the process (launch, `begin`, `advance`, `is_alive`,
//!   `shutdown`) goes through [`FrameGuard`], so no process failure unwinds
//!   out of the scheduler

use crate::guard::FrameGuard;
use crate::hook::HookChain;
use crate::report::{LogReporter, Reporter};
use serde::{Deserialize, Serialize};
use std::fmt;
use steppable::{Launcher, StepFault, Steppable};
use thiserror::Error;
use tick_source::TickSource;
use uuid::Uuid;

/// Identifies one Start..Stop run of the stepped process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run:{}", self.0)
    }
}

/// Scheduler run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Idle calls only forward to the hook chain
    Stopped,
    /// Idle calls advance the process by one frame
    Running,
}

/// Rejected start/stop requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Already running ({0})")]
    AlreadyRunning(RunId),

    #[error("Not running")]
    NotRunning,

    #[error("Launch failed: {0}")]
    LaunchFailed(StepFault),
}

/// Outcome notifications, recorded in the audit trail and reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// A new run began
    Started { run_id: RunId },
    /// Start was requested during a run
    AlreadyRunning { run_id: RunId },
    /// The run was stopped on request
    Stopped { run_id: RunId, frames: u64 },
    /// Stop was requested with no run in progress
    NotRunning,
    /// The process ended itself
    SelfTerminated { run_id: RunId, frames: u64 },
    /// A frame failed and ended the run
    Faulted {
        run_id: RunId,
        frames: u64,
        fault: StepFault,
    },
    /// Start could not build or begin a process; nothing was armed
    LaunchFailed { fault: StepFault },
}

/// Default number of events kept in the audit log
pub const DEFAULT_AUDIT_CAPACITY: usize = 256;

/// Idle-driven scheduler for a single steppable process
pub struct Scheduler<T: TickSource> {
    state: SchedulerState,
    hooks: HookChain,
    launcher: Launcher,
    active: Option<Box<dyn Steppable>>,
    ticks: T,
    reporter: Box<dyn Reporter>,
    run_id: Option<RunId>,
    frames: u64,
    last_error: Option<StepFault>,
    /// Audit log of outcomes, oldest dropped first past `audit_capacity`
    audit_log: Vec<SchedulerEvent>,
    audit_capacity: usize,
}

impl<T: TickSource> Scheduler<T> {
    /// Creates a stopped scheduler
    ///
    /// `hooks` is the idle behavior captured at installation; `launcher`
    /// produces a fresh process for every start.
    pub fn new(hooks: HookChain, launcher: Launcher, ticks: T) -> Self {
        Self {
            state: SchedulerState::Stopped,
            hooks,
            launcher,
            active: None,
            ticks,
            reporter: Box::new(LogReporter),
            run_id: None,
            frames: 0,
            last_error: None,
            audit_log: Vec::new(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }

    /// Sets how many events the audit log keeps (at least one)
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity.max(1);
        self.trim_audit_log();
        self
    }

    /// Replaces the reporter that surfaces outcomes to the user
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Starts a new run
    ///
    /// Arms the tick source and launches a fresh process. Does not run a
    /// frame; the first frame happens on the next idle call. A launch that
    /// fails leaves the scheduler stopped and unarmed, with the fault
    /// recorded as the last error.
    pub fn start(&mut self) -> Result<RunId, SchedulerError> {
        if let (SchedulerState::Running, Some(run_id)) = (self.state, self.run_id) {
            self.emit(SchedulerEvent::AlreadyRunning { run_id });
            return Err(SchedulerError::AlreadyRunning(run_id));
        }

        let process = match FrameGuard::launch(&mut self.launcher) {
            Ok(process) => process,
            Err(fault) => {
                self.last_error = Some(fault.clone());
                self.emit(SchedulerEvent::LaunchFailed {
                    fault: fault.clone(),
                });
                return Err(SchedulerError::LaunchFailed(fault));
            }
        };

        let run_id = RunId::new();
        self.ticks.arm();
        self.active = Some(process);
        self.run_id = Some(run_id);
        self.frames = 0;
        self.last_error = None;
        self.state = SchedulerState::Running;

        self.emit(SchedulerEvent::Started { run_id });
        Ok(run_id)
    }

    /// Stops the current run
    ///
    /// Takes effect immediately for state; the process's own shutdown runs
    /// if it is still alive.
    pub fn stop(&mut self) -> Result<(), SchedulerError> {
        let Some(run_id) = self.running_id() else {
            self.emit(SchedulerEvent::NotRunning);
            return Err(SchedulerError::NotRunning);
        };

        self.retire();
        self.emit(SchedulerEvent::Stopped {
            run_id,
            frames: self.frames,
        });
        Ok(())
    }

    /// Stops when running, starts otherwise
    pub fn toggle(&mut self) -> SchedulerState {
        let result = match self.state {
            SchedulerState::Running => self.stop(),
            SchedulerState::Stopped => self.start().map(|_| ()),
        };
        if let Err(e) = result {
            log::debug!("toggle ignored: {}", e);
        }
        self.state
    }

    /// The idle-hook body, called by the host on every idle poll
    ///
    /// Runs at most one frame, waits at most one tick, then forwards to the
    /// previous idle behavior exactly once.
    pub fn on_idle(&mut self) {
        self.step();
        self.hooks.invoke_previous();
    }

    /// The scheduling half of [`Scheduler::on_idle`], without the chain
    ///
    /// Callers that use this directly own the duty of invoking
    /// [`Scheduler::hooks`] once per idle call.
    pub fn step(&mut self) {
        if let Some(run_id) = self.running_id() {
            self.run_frame(run_id);
        }
    }

    /// The captured previous idle behavior
    pub fn hooks(&self) -> HookChain {
        self.hooks.clone()
    }

    fn run_frame(&mut self, run_id: RunId) {
        let Some(process) = self.active.as_mut() else {
            log::error!("{} running without a process; stopping", run_id);
            self.retire();
            return;
        };

        let frame = match FrameGuard::alive(&**process) {
            Ok(true) => FrameGuard::run(&mut **process),
            Ok(false) => {
                self.retire();
                self.emit(SchedulerEvent::SelfTerminated {
                    run_id,
                    frames: self.frames,
                });
                return;
            }
            Err(fault) => Err(fault),
        };

        match frame {
            Ok(()) => {
                self.frames += 1;
                self.ticks.wait_next_tick();
            }
            Err(fault) => {
                self.retire();
                self.last_error = Some(fault.clone());
                self.emit(SchedulerEvent::Faulted {
                    run_id,
                    frames: self.frames,
                    fault,
                });
            }
        }
    }

    /// Ends the current run: shared by stop, fault and self-termination
    ///
    /// A process whose liveness check fails is treated as alive and still
    /// gets its shutdown.
    fn retire(&mut self) {
        if let Some(mut process) = self.active.take() {
            let alive = FrameGuard::alive(&*process).unwrap_or_else(|fault| {
                log::warn!("liveness check failed during cleanup: {}", fault);
                true
            });
            if alive {
                if let Err(fault) = FrameGuard::contain(|| {
                    process.shutdown();
                    Ok(())
                }) {
                    log::warn!("process shutdown failed: {}", fault);
                }
            }
        }
        if self.ticks.is_armed() {
            self.ticks.disarm();
        }
        self.state = SchedulerState::Stopped;
    }

    fn running_id(&self) -> Option<RunId> {
        match self.state {
            SchedulerState::Running => self.run_id,
            SchedulerState::Stopped => None,
        }
    }

    fn emit(&mut self, event: SchedulerEvent) {
        self.reporter.report(&event);
        self.audit_log.push(event);
        self.trim_audit_log();
    }

    fn trim_audit_log(&mut self) {
        if self.audit_log.len() > self.audit_capacity {
            let excess = self.audit_log.len() - self.audit_capacity;
            self.audit_log.drain(..excess);
        }
    }

    /// Returns the current state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns true while running
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Returns the current run, or the last one after it ended
    pub fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    /// Frames advanced in the current (or last) run
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The most recent frame fault, cleared by a successful start
    pub fn last_error(&self) -> Option<&StepFault> {
        self.last_error.as_ref()
    }

    /// Status snapshot of the active process, if any
    pub fn describe(&self) -> Option<String> {
        self.active.as_ref().and_then(|process| process.describe())
    }

    /// Returns the tick source
    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    /// Returns the audit log
    pub fn events(&self) -> &[SchedulerEvent] {
        &self.audit_log
    }

    /// Maximum number of events the audit log keeps
    pub fn audit_capacity(&self) -> usize {
        self.audit_capacity
    }

    /// Clears the audit log
    pub fn clear_events(&mut self) {
        self.audit_log.clear();
    }
}
