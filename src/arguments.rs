/// Command-line argument handling for the vendorboard inspection tool
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::logger::LogLevel;

#[derive(Debug, Parser)]
#[command(
    name = "vendorboard",
    version,
    about = "Inspection tool for the vendorboard data layer (cache, providers, orchestration)"
)]
pub struct Arguments {
    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = verbose)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve and print a contractor detail view
    View {
        /// Contractor id, e.g. ACME-001
        id: String,

        /// Emit the raw view as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Resolve and print a portfolio view
    Portfolio {
        /// Portfolio id, e.g. PF-100
        id: String,

        /// Emit the raw view as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Print cache and backend statistics
    Stats,

    /// Invalidate cache entries whose keys match a regex
    Invalidate {
        /// Key pattern, e.g. '^contractor:ACME-001:'
        pattern: String,
    },

    /// Run an offline walkthrough of caching, fallback, and invalidation
    Demo,
}

impl Arguments {
    pub fn log_level(&self) -> LogLevel {
        if self.quiet {
            LogLevel::Warning
        } else {
            match self.verbose {
                0 => LogLevel::Info,
                1 => LogLevel::Debug,
                _ => LogLevel::Verbose,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_command() {
        let args = Arguments::parse_from(["vendorboard", "view", "ACME-001", "--json"]);
        match args.command {
            Command::View { id, json } => {
                assert_eq!(id, "ACME-001");
                assert!(json);
            }
            _ => panic!("expected view command"),
        }
    }

    #[test]
    fn test_verbosity_mapping() {
        let args = Arguments::parse_from(["vendorboard", "-vv", "demo"]);
        assert_eq!(args.log_level(), LogLevel::Verbose);

        let args = Arguments::parse_from(["vendorboard", "--quiet", "demo"]);
        assert_eq!(args.log_level(), LogLevel::Warning);

        let args = Arguments::parse_from(["vendorboard", "stats"]);
        assert_eq!(args.log_level(), LogLevel::Info);
    }
}
