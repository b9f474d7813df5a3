//! Command-line interface
//!
//! - Argument parsing structures
//! - Command implementations
//! - Terminal rendering

pub mod args;
pub mod commands;
pub mod display;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;
