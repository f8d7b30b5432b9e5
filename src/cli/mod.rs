//! CLI module for rwstore
//!
//! Provides the command source for the engine:
//! - shell: read/write/stats/exit commands from stdin
//! - simulate: concurrent readers and writers against one record

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, run, run_command, shell, simulate, ShellOptions};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_command, write_error, write_response, ShellCommand};
