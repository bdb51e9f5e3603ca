//! CLI module for FocusPlay.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `foreground`: Runs a session in the terminal until it ends
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod foreground;

pub use commands::{Cli, Commands, MusicArgs, ProfileArgs, ProfileCommands, StartArgs};
pub use display::Display;
pub use foreground::{Context, SessionEnd};
