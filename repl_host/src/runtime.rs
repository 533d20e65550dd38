//! # Host Runtime
//!
//! The blocking input loop: poll, assemble lines, dispatch commands,
//! and hand every empty poll to the idle slot.

use crate::commands::{HostCommand, HostCommandParser};
use crate::config::HostConfig;
use crate::console::{Console, ConsoleReporter};
use crate::input::{InputPoll, InputScriptError, InputSource};
use idle_scheduler::{
    IdleSlot, Launcher, Scheduler, SchedulerHandle, SchedulerState, Steppable, TickSource,
};
use life_game::{LifeConfigError, LifeGame};
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use thiserror::Error;
use tick_source::{IntervalTicker, TickSourceError};

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid game config: {0}")]
    Life(#[from] LifeConfigError),

    #[error("Tick source error: {0}")]
    TickSource(#[from] TickSourceError),

    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("Usage error: {0}")]
    Usage(String),
}

/// Host loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Running,
    Shutdown,
}

/// The REPL host
pub struct ReplHost<T: TickSource + 'static> {
    config: HostConfig,
    slot: IdleSlot,
    scheduler: SchedulerHandle<T>,
    console: Console,
    host_idles: Rc<Cell<u64>>,
    line: String,
    polls: usize,
    state: HostState,
}

impl ReplHost<IntervalTicker> {
    /// Creates a host running the Life game at the configured tick rate
    pub fn from_config(config: HostConfig, console: Console) -> Result<Self, HostError> {
        config.life.validate()?;
        let ticks = IntervalTicker::new(config.tick_interval())?;
        let life = config.life.clone();
        let launcher: Launcher =
            Box::new(move || Ok(Box::new(LifeGame::new(life.clone())?) as Box<dyn Steppable>));
        Ok(Self::new(config, launcher, ticks, console))
    }
}

impl<T: TickSource + 'static> ReplHost<T> {
    /// Creates a host and installs the scheduler in its idle slot
    ///
    /// The host's own idle behavior (backoff sleep) is what the scheduler
    /// captures and chains to.
    pub fn new(config: HostConfig, launcher: Launcher, ticks: T, console: Console) -> Self {
        let host_idles = Rc::new(Cell::new(0));
        let counter = Rc::clone(&host_idles);
        let backoff = config.idle_backoff();
        let mut slot = IdleSlot::with_callback(Box::new(move || {
            counter.set(counter.get() + 1);
            if !backoff.is_zero() {
                thread::sleep(backoff);
            }
        }));

        let reporter = ConsoleReporter::new(console.clone());
        let scheduler = SchedulerHandle::install(&mut slot, move |hooks| {
            Scheduler::new(hooks, launcher, ticks).with_reporter(Box::new(reporter))
        });

        Self {
            config,
            slot,
            scheduler,
            console,
            host_idles,
            line: String::new(),
            polls: 0,
            state: HostState::Running,
        }
    }

    /// Runs the host loop
    ///
    /// Returns when:
    /// - Quit command received
    /// - Input closed
    /// - Max polls reached (if configured)
    pub fn run(&mut self, input: &mut dyn InputSource) -> Result<(), HostError> {
        self.console.prompt(&self.config.prompt);

        loop {
            if self.state == HostState::Shutdown {
                break;
            }

            if self.config.max_polls > 0 && self.polls >= self.config.max_polls {
                log::debug!("poll limit {} reached", self.config.max_polls);
                break;
            }

            self.polls += 1;
            match input.poll() {
                InputPoll::Char('\n') => {
                    let line = std::mem::take(&mut self.line);
                    self.dispatch(&line);
                    if self.state == HostState::Running {
                        self.console.prompt(&self.config.prompt);
                    }
                }
                InputPoll::Char('\r') => {}
                InputPoll::Char(c) => self.line.push(c),
                InputPoll::Pending => self.slot.invoke(),
                InputPoll::Closed => {
                    log::debug!("input closed");
                    break;
                }
            }
        }

        self.finish();
        Ok(())
    }

    /// Executes one command line
    pub fn dispatch(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let command = match HostCommandParser::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.console.print_line(format!("Error: {}", e));
                return;
            }
        };

        // Start/stop/toggle outcomes are printed by the scheduler's reporter.
        match command {
            HostCommand::Start => {
                let _ = self.scheduler.start();
            }
            HostCommand::Stop => {
                let _ = self.scheduler.stop();
            }
            HostCommand::Toggle => {
                self.scheduler.toggle();
            }
            HostCommand::Status => self.print_status(),
            HostCommand::Show => {
                let snapshot = self.scheduler.scheduler().describe();
                match snapshot {
                    Some(text) => self.console.print_block(&text),
                    None => self.console.print_line("No game running."),
                }
            }
            HostCommand::Help => {
                for (name, help) in HostCommand::HELP {
                    self.console.print_line(format!("  {:<8} {}", name, help));
                }
            }
            HostCommand::Quit => self.state = HostState::Shutdown,
        }
    }

    fn print_status(&self) {
        let scheduler = self.scheduler.scheduler();
        let line = match (scheduler.state(), scheduler.run_id()) {
            (SchedulerState::Running, Some(run_id)) => {
                format!("Game running ({}, {} frames).", run_id, scheduler.frames())
            }
            _ => match scheduler.last_error() {
                Some(fault) => format!("Game not running. Last error: {}", fault),
                None => "Game not running.".to_string(),
            },
        };
        self.console.print_line(line);
    }

    /// Stops a run still in progress when the host exits
    fn finish(&mut self) {
        if self.scheduler.state() == SchedulerState::Running {
            let _ = self.scheduler.stop();
        }
    }

    /// Returns the scheduler handle
    pub fn scheduler(&self) -> &SchedulerHandle<T> {
        &self.scheduler
    }

    /// Returns the console
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Number of input polls performed
    pub fn poll_count(&self) -> usize {
        self.polls
    }

    /// Number of times the host's own idle behavior ran
    pub fn host_idle_count(&self) -> u64 {
        self.host_idles.get()
    }

    /// Number of times the idle slot was invoked
    pub fn idle_slot_count(&self) -> u64 {
        self.slot.invocations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputScript;
    use life_game::LifeConfig;
    use tick_source::SimTickSource;

    fn test_config() -> HostConfig {
        HostConfig {
            idle_backoff_ms: 0,
            echo: false,
            ..HostConfig::default()
        }
    }

    fn life_host(life: LifeConfig) -> ReplHost<SimTickSource> {
        let launcher: Launcher =
            Box::new(move || Ok(Box::new(LifeGame::new(life.clone())?) as Box<dyn Steppable>));
        ReplHost::new(test_config(), launcher, SimTickSource::new(), Console::captured())
    }

    fn run_script(host: &mut ReplHost<SimTickSource>, text: &str) {
        let mut script = InputScript::from_text(text).unwrap();
        host.run(&mut script).unwrap();
    }

    #[test]
    fn test_start_frames_stop() {
        let mut host = life_host(LifeConfig::default());

        run_script(&mut host, "start\nwait 5\nstatus\nstop");

        let lines = host.console().lines();
        assert_eq!(lines[0], "Game started (REPL mode)...");
        assert!(lines[1].starts_with("Game running (run:"));
        assert!(lines[1].ends_with(", 5 frames)."));
        assert_eq!(lines[2], "Game stopped.");
        assert_eq!(host.scheduler().scheduler().ticks().wait_calls(), 5);
    }

    #[test]
    fn test_idle_polls_always_reach_host_idle() {
        let mut host = life_host(LifeConfig::default());

        run_script(&mut host, "wait 3\nstart\nwait 4\nstop\nwait 2");

        assert_eq!(host.idle_slot_count(), 9);
        assert_eq!(host.host_idle_count(), 9);
    }

    #[test]
    fn test_noop_messages() {
        let mut host = life_host(LifeConfig::default());

        run_script(&mut host, "stop\nstart\nstart\nstop\nstop");

        assert_eq!(
            host.console().lines(),
            vec![
                "Game is not running.",
                "Game started (REPL mode)...",
                "Game already running.",
                "Game stopped.",
                "Game is not running.",
            ]
        );
    }

    #[test]
    fn test_toggle() {
        let mut host = life_host(LifeConfig::default());

        run_script(&mut host, "toggle\nwait 1\ntoggle");

        assert_eq!(
            host.console().lines(),
            vec!["Game started (REPL mode)...", "Game stopped."]
        );
    }

    #[test]
    fn test_fault_reported() {
        let mut host = life_host(LifeConfig {
            fault_at: Some(3),
            ..LifeConfig::default()
        });

        run_script(&mut host, "start\nwait 5\nstatus");

        let lines = host.console().lines();
        assert_eq!(
            lines[1],
            "Game error: error: injected fault at generation 3"
        );
        assert_eq!(
            lines[2],
            "Game not running. Last error: error: injected fault at generation 3"
        );
        assert_eq!(host.scheduler().state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_self_termination_reported() {
        let mut host = life_host(LifeConfig {
            max_generations: 2,
            ..LifeConfig::default()
        });

        run_script(&mut host, "start\nwait 4");

        let lines = host.console().lines();
        assert_eq!(lines.last().map(String::as_str), Some("Game ended on its own."));
        assert_eq!(host.scheduler().state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_show_snapshot() {
        let mut host = life_host(LifeConfig {
            width: 4,
            height: 3,
            ..LifeConfig::default()
        });

        run_script(&mut host, "show\nstart\nshow");

        let lines = host.console().lines();
        assert_eq!(lines[0], "No game running.");
        assert!(lines[2].starts_with("generation 0 | population"));
        assert_eq!(lines.len(), 3 + 3);
    }

    #[test]
    fn test_unknown_command() {
        let mut host = life_host(LifeConfig::default());
        run_script(&mut host, "dance");
        assert_eq!(host.console().lines(), vec!["Error: Unknown command: dance"]);
    }

    #[test]
    fn test_help_lists_commands() {
        let mut host = life_host(LifeConfig::default());
        run_script(&mut host, "help");
        assert_eq!(host.console().lines().len(), HostCommand::HELP.len());
    }

    #[test]
    fn test_quit_stops_loop_and_game() {
        let mut host = life_host(LifeConfig::default());

        run_script(&mut host, "start\nquit\nwait 10");

        assert_eq!(host.idle_slot_count(), 0);
        assert_eq!(host.scheduler().state(), SchedulerState::Stopped);
        assert_eq!(
            host.console().lines(),
            vec!["Game started (REPL mode)...", "Game stopped."]
        );
    }

    #[test]
    fn test_max_polls() {
        let mut host = life_host(LifeConfig::default());
        host.config.max_polls = 3;

        run_script(&mut host, "wait 10");

        assert_eq!(host.poll_count(), 3);
        assert_eq!(host.idle_slot_count(), 3);
    }

    #[test]
    fn test_carriage_returns_ignored() {
        let mut host = life_host(LifeConfig::default());
        let mut script = InputScript::new();
        script.push_line("status\r");
        host.run(&mut script).unwrap();
        assert_eq!(host.console().lines(), vec!["Game not running."]);
    }

    #[test]
    fn test_from_config_rejects_zero_tick() {
        let config = HostConfig {
            tick_ms: 0,
            ..test_config()
        };
        let result = ReplHost::from_config(config, Console::captured());
        assert!(matches!(result, Err(HostError::TickSource(_))));
    }

    #[test]
    fn test_from_config_rejects_oversized_board() {
        let config = HostConfig {
            life: LifeConfig {
                width: usize::MAX / 2,
                height: 4,
                ..LifeConfig::default()
            },
            ..test_config()
        };
        let result = ReplHost::from_config(config, Console::captured());
        assert!(matches!(result, Err(HostError::Life(_))));
    }

    #[test]
    fn test_failed_launch_reported_and_host_keeps_running() {
        let mut host = life_host(LifeConfig {
            width: usize::MAX / 2,
            height: 4,
            ..LifeConfig::default()
        });

        run_script(&mut host, "start\nwait 2\nstatus");

        let lines = host.console().lines();
        assert!(lines[0].starts_with("Game could not start: error: Board too large"));
        assert!(lines[1].starts_with("Game not running. Last error: error: Board too large"));
        assert_eq!(host.scheduler().state(), SchedulerState::Stopped);
        assert_eq!(host.host_idle_count(), 2);
    }
}
