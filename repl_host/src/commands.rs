//! # Host Commands
//!
//! The command surface typed at the host prompt.
//!
//! ## Command Set
//!
//! - `start` - Start the game
//! - `stop` - Stop the game
//! - `toggle` - Start or stop, whichever applies
//! - `status` - Print the scheduler state
//! - `show` - Print the game's current snapshot
//! - `help` - List commands
//! - `quit` - Exit the host

use thiserror::Error;

/// Host command error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostCommandError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unexpected argument for {command}: {argument}")]
    UnexpectedArgument { command: String, argument: String },
}

/// Host commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Stop,
    Toggle,
    Status,
    Show,
    Help,
    Quit,
}

impl HostCommand {
    /// One-line help for each command, in display order
    pub const HELP: &'static [(&'static str, &'static str)] = &[
        ("start", "start the game"),
        ("stop", "stop the game"),
        ("toggle", "start or stop the game"),
        ("status", "show whether the game is running"),
        ("show", "print the current game board"),
        ("help", "list commands"),
        ("quit", "exit"),
    ];
}

/// Host command parser
pub struct HostCommandParser;

impl HostCommandParser {
    /// Parses a command line
    pub fn parse(input: &str) -> Result<HostCommand, HostCommandError> {
        let mut parts = input.split_whitespace();
        let cmd = parts
            .next()
            .ok_or(HostCommandError::EmptyCommand)?
            .to_lowercase();

        let command = match cmd.as_str() {
            "start" => HostCommand::Start,
            "stop" => HostCommand::Stop,
            "toggle" => HostCommand::Toggle,
            "status" => HostCommand::Status,
            "show" => HostCommand::Show,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" => HostCommand::Quit,
            _ => return Err(HostCommandError::UnknownCommand(cmd)),
        };

        if let Some(argument) = parts.next() {
            return Err(HostCommandError::UnexpectedArgument {
                command: cmd,
                argument: argument.to_string(),
            });
        }

        Ok(command)
    }
}
