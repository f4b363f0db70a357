//! Command-line interface for lostfound.
//!
//! This module provides the CLI structure for the `lostfound` binary.
//! Handlers live in the binary itself.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ReportsCommand, ServeCommand, StatusCommand};

/// lostfound - Airport lost and found desk
///
/// Passengers report lost items and track them by ID; staff mark items
/// found and claimed from an admin dashboard.
#[derive(Debug, Parser)]
#[command(name = "lostfound")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web application
    Serve(ServeCommand),

    /// Show report counts and the database location
    Status(StatusCommand),

    /// Inspect stored reports
    #[command(subcommand)]
    Reports(ReportsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "lostfound");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["lostfound", "-q", "status"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["lostfound", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["lostfound", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["lostfound", "-vv", "status"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve() {
        let cli = parse(&["lostfound", "serve"]);
        assert!(matches!(cli.command, Command::Serve(ServeCommand { bind: None })));

        let cli = parse(&["lostfound", "serve", "--bind", "0.0.0.0:8080"]);
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.bind, Some("0.0.0.0:8080".parse().unwrap()));
    }

    #[test]
    fn test_parse_serve_rejects_bad_address() {
        assert!(Cli::try_parse_from(["lostfound", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn test_parse_reports() {
        let cli = parse(&["lostfound", "reports", "list", "--limit", "5", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Reports(ReportsCommand::List { limit: 5, json: true })
        ));

        let cli = parse(&["lostfound", "reports", "show", "lf-240101-abc123"]);
        let Command::Reports(ReportsCommand::Show { tracking_id, json }) = cli.command else {
            panic!("expected reports show");
        };
        assert_eq!(tracking_id, "lf-240101-abc123");
        assert!(!json);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["lostfound", "config", "validate", "--file", "/tmp/c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["lostfound", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
