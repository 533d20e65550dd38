//! # REPL Host
//!
//! A line-oriented host that lends its idle time to a frame-stepped game.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: The game never prints; the host renders its snapshot on request
//! - **Input is polled**: Each poll yields a character, nothing yet, or end of input
//! - **Idle is a slot**: Every empty poll invokes whatever sits in the idle slot
//! - **Deterministic mode is first-class**: Scripted input drives tests and demos
//!
//! ## Responsibilities
//!
//! The host:
//! - Assembles characters into lines and dispatches them as commands
//! - Installs the idle scheduler in its idle slot at construction
//! - Maps start/stop/toggle to the scheduler and prints one status line per outcome
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Step the game itself (the scheduler does, from the idle slot)
//! - Provide line editing, history or completion

pub mod commands;
pub mod config;
pub mod console;
pub mod input;
pub mod runtime;

pub use commands::{HostCommand, HostCommandError, HostCommandParser};
pub use config::HostConfig;
pub use console::{Console, ConsoleReporter};
pub use input::{InputPoll, InputScript, InputScriptError, InputSource, StdinSource};
pub use runtime::{HostError, ReplHost};
