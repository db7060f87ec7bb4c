//! slotcheck CLI library
//!
//! Argument parsing, logging setup and command handlers for the `slotcheck`
//! binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{verdict_line, ProgressReporter};
