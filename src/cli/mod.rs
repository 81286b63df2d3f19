//! Command-line interface definitions.
//!
//! - `Cli`, `Commands`: CLI argument definitions via clap
//! - `Display`: formatted terminal output for assessments, reports and health

mod commands;
mod display;

pub use commands::{Cli, Commands, ConfigAction, OutputFormat, StrategyArg};
pub use display::Display;
