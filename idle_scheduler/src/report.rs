//! Surfacing scheduler outcomes.

use crate::scheduler::SchedulerEvent;

/// Receives every scheduler outcome as it happens
pub trait Reporter {
    fn report(&mut self, event: &SchedulerEvent);
}

/// Reports through the `log` facade
///
/// Lifecycle at info, rejected requests at warn, faults at error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: &SchedulerEvent) {
        match event {
            SchedulerEvent::Started { run_id } => log::info!("{} started", run_id),
            SchedulerEvent::AlreadyRunning { run_id } => {
                log::warn!("start ignored: {} already running", run_id)
            }
            SchedulerEvent::Stopped { run_id, frames } => {
                log::info!("{} stopped after {} frames", run_id, frames)
            }
            SchedulerEvent::NotRunning => log::warn!("stop ignored: not running"),
            SchedulerEvent::SelfTerminated { run_id, frames } => {
                log::info!("{} ended itself after {} frames", run_id, frames)
            }
            SchedulerEvent::Faulted {
                run_id,
                frames,
                fault,
            } => log::error!("{} faulted after {} frames: {}", run_id, frames, fault),
            SchedulerEvent::LaunchFailed { fault } => log::error!("launch failed: {}", fault),
        }
    }
}

impl<F> Reporter for F
where
    F: FnMut(&SchedulerEvent),
{
    fn report(&mut self, event: &SchedulerEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RunId;
    use steppable::StepFault;

    #[test]
    fn test_log_reporter_accepts_all_events() {
        let run_id = RunId::new();
        let mut reporter = LogReporter;
        for event in [
            SchedulerEvent::Started { run_id },
            SchedulerEvent::AlreadyRunning { run_id },
            SchedulerEvent::Stopped { run_id, frames: 3 },
            SchedulerEvent::NotRunning,
            SchedulerEvent::SelfTerminated { run_id, frames: 9 },
            SchedulerEvent::Faulted {
                run_id,
                frames: 2,
                fault: StepFault::error("boom"),
            },
            SchedulerEvent::LaunchFailed {
                fault: StepFault::panic("no board"),
            },
        ] {
            reporter.report(&event);
        }
    }

    #[test]
    fn test_closure_reporter() {
        let mut count = 0;
        {
            let mut reporter = |_: &SchedulerEvent| count += 1;
            reporter.report(&SchedulerEvent::NotRunning);
            reporter.report(&SchedulerEvent::NotRunning);
        }
        assert_eq!(count, 2);
    }
}
