//! Host console output and the status lines for scheduler outcomes.

use idle_scheduler::{LogReporter, Reporter, SchedulerEvent};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

struct ConsoleBuffer {
    echo: bool,
    lines: Vec<String>,
}

/// Line-oriented output owned by the host
///
/// Echoing consoles print to stdout; capturing consoles keep the lines
/// for inspection.
#[derive(Clone)]
pub struct Console {
    inner: Rc<RefCell<ConsoleBuffer>>,
}

impl Console {
    /// A console printing to stdout
    pub fn stdout() -> Self {
        Self::with_echo(true)
    }

    /// A console keeping its lines in memory
    pub fn captured() -> Self {
        Self::with_echo(false)
    }

    fn with_echo(echo: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ConsoleBuffer {
                echo,
                lines: Vec::new(),
            })),
        }
    }

    /// Writes one line
    pub fn print_line(&self, line: impl Into<String>) {
        let line = line.into();
        let mut buffer = self.inner.borrow_mut();
        if buffer.echo {
            println!("{}", line);
        } else {
            buffer.lines.push(line);
        }
    }

    /// Writes a multi-line block, one line at a time
    pub fn print_block(&self, block: &str) {
        for line in block.lines() {
            self.print_line(line);
        }
    }

    /// Prints the prompt without a trailing newline
    pub fn prompt(&self, prompt: &str) {
        if self.inner.borrow().echo {
            print!("{}", prompt);
            let _ = io::stdout().flush();
        }
    }

    /// Lines captured so far
    pub fn lines(&self) -> Vec<String> {
        self.inner.borrow().lines.clone()
    }

    /// Drains the captured lines
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().lines)
    }
}

/// The status line printed for each scheduler outcome
pub fn status_line(event: &SchedulerEvent) -> String {
    match event {
        SchedulerEvent::Started { .. } => "Game started (REPL mode)...".to_string(),
        SchedulerEvent::AlreadyRunning { .. } => "Game already running.".to_string(),
        SchedulerEvent::Stopped { .. } => "Game stopped.".to_string(),
        SchedulerEvent::NotRunning => "Game is not running.".to_string(),
        SchedulerEvent::SelfTerminated { .. } => "Game ended on its own.".to_string(),
        SchedulerEvent::Faulted { fault, .. } => format!("Game error: {}", fault),
        SchedulerEvent::LaunchFailed { fault } => format!("Game could not start: {}", fault),
    }
}

/// Prints a status line per outcome and logs it
pub struct ConsoleReporter {
    console: Console,
    log: LogReporter,
}

impl ConsoleReporter {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            log: LogReporter,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: &SchedulerEvent) {
        self.log.report(event);
        self.console.print_line(status_line(event));
    }
}
