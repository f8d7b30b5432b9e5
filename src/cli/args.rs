//! CLI argument definitions using clap
//!
//! Commands:
//! - rwstore shell [--concurrent]
//! - rwstore simulate --readers <n> --writers <n>
//!
//! `--config <path>` is accepted by every command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rwstore - concurrent readers-writers record store
#[derive(Parser, Debug)]
#[command(name = "rwstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Read commands from stdin: read <name>, write <name> <payload>, stats, exit
    Shell {
        /// Do not wait for each request before reading the next command
        #[arg(long)]
        concurrent: bool,
    },

    /// Run readers and writers against one record at the same time
    Simulate {
        /// Number of concurrent readers
        #[arg(long, default_value_t = 3)]
        readers: usize,

        /// Number of concurrent writers
        #[arg(long, default_value_t = 2)]
        writers: usize,

        /// Record to contend on
        #[arg(long, default_value = "shared")]
        record: String,

        /// Payload each writer appends
        #[arg(long, default_value = "data")]
        payload: String,
    },
}

impl Command {
    /// Subcommand name as typed
    pub fn name(&self) -> &'static str {
        match self {
            Command::Shell { .. } => "shell",
            Command::Simulate { .. } => "simulate",
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell() {
        let cli = Cli::try_parse_from(["rwstore", "shell", "--concurrent"]).unwrap();
        assert_eq!(cli.command, Command::Shell { concurrent: true });
        assert!(cli.config.is_none());
        assert_eq!(cli.command.name(), "shell");
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["rwstore", "simulate", "--config", "rw.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("rw.json")));
        assert_eq!(
            cli.command,
            Command::Simulate {
                readers: 3,
                writers: 2,
                record: "shared".into(),
                payload: "data".into(),
            }
        );
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["rwstore"]).is_err());
    }
}
