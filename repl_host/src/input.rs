//! # Input Polling
//!
//! Character-level input sources for the host loop.
//!
//! ## Script Format
//!
//! Scripts are line-based:
//! - Any line is typed as its characters followed by Enter
//! - `wait <n>`: the next `n` polls find no input (idle polls)
//! - Comments: `# This is a comment`
//! - Blank lines are skipped
//!
//! ## Example
//!
//! ```text
//! start
//! wait 30     # thirty idle polls, thirty frames
//! show
//! stop
//! ```

use crossbeam_channel::{Receiver, TryRecvError};
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::thread;
use thiserror::Error;

/// Result of one input poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPoll {
    /// A character was read
    Char(char),
    /// Nothing to read yet
    Pending,
    /// Input has ended
    Closed,
}

/// A pollable character input
pub trait InputSource {
    /// Polls for the next character without blocking
    fn poll(&mut self) -> InputPoll;
}

/// Input script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// Deterministic scripted input
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<InputPoll>,
}

impl InputScript {
    /// Creates a new empty input script
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (line_num, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            inputs.extend(Self::parse_line(line, line_num + 1)?);
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }

        Ok(Self { inputs })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Vec<InputPoll>, InputScriptError> {
        if let Some(count) = line.strip_prefix("wait ") {
            let count: usize = count.trim().parse().map_err(|_| InputScriptError::ParseError {
                line: line_num,
                message: format!("invalid wait count: {}", count.trim()),
            })?;
            return Ok(vec![InputPoll::Pending; count]);
        }

        Ok(line
            .chars()
            .chain(std::iter::once('\n'))
            .map(InputPoll::Char)
            .collect())
    }

    /// Appends a typed line
    pub fn push_line(&mut self, line: &str) {
        self.inputs.extend(line.chars().map(InputPoll::Char));
        self.inputs.push_back(InputPoll::Char('\n'));
    }

    /// Appends `count` idle polls
    pub fn push_idle(&mut self, count: usize) {
        self.inputs.extend(std::iter::repeat(InputPoll::Pending).take(count));
    }

    /// Returns true if the script has more inputs
    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Returns the number of remaining inputs
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl InputSource for InputScript {
    fn poll(&mut self) -> InputPoll {
        self.inputs.pop_front().unwrap_or(InputPoll::Closed)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Standard input, read on a background thread
///
/// The reader thread is host plumbing: it blocks on stdin so the host
/// loop never does. Lines arrive over a channel and are handed out one
/// character per poll.
pub struct StdinSource {
    lines: Receiver<String>,
    pending: VecDeque<char>,
}

impl StdinSource {
    /// Spawns the stdin reader thread
    pub fn spawn() -> io::Result<Self> {
        let (sender, lines) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            if sender.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::error!("stdin read failed: {}", e);
                            break;
                        }
                    }
                }
            })?;
        Ok(Self::from_receiver(lines))
    }

    /// Wraps an existing line channel
    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self {
            lines,
            pending: VecDeque::new(),
        }
    }
}

impl InputSource for StdinSource {
    fn poll(&mut self) -> InputPoll {
        if let Some(c) = self.pending.pop_front() {
            return InputPoll::Char(c);
        }

        match self.lines.try_recv() {
            Ok(line) => {
                self.pending.extend(line.chars());
                self.pending.push_back('\n');
                self.poll()
            }
            Err(TryRecvError::Empty) => InputPoll::Pending,
            Err(TryRecvError::Disconnected) => InputPoll::Closed,
        }
    }
}
