//! CLI module for the configuration tool.
//!
//! This module provides the command-line interface for inspecting and
//! updating the configuration cascade.

mod assignments;
mod commands;
mod output;

pub use assignments::parse_assignments;
pub use commands::{Cli, Commands, OutputFormat, SetArgs};
pub use output::OutputFormatter;
