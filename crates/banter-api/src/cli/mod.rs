//! CLI command definitions for the `banter` binary.
//!
//! `serve` runs the web chat; `turns` is the admin surface over stored
//! conversation turns.

pub mod turns;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Web chat front-end for an OpenAI-compatible completion service.
#[derive(Parser)]
#[command(name = "banter", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to config.toml (defaults to `{data_dir}/config.toml`).
    #[arg(long, global = true, env = "BANTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web chat server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect and manage stored chat turns.
    Turns {
        #[command(subcommand)]
        command: TurnsCommand,
    },
}

#[derive(Subcommand)]
pub enum TurnsCommand {
    /// List turns, newest first.
    #[command(alias = "ls")]
    List {
        /// Only turns from this session.
        #[arg(long)]
        session: Option<String>,

        /// Case-insensitive text to look for in messages and responses.
        #[arg(long)]
        search: Option<String>,

        /// Maximum number of turns to show.
        #[arg(long, default_value = "50")]
        limit: i64,
    },

    /// List sessions with turn counts and last activity.
    Sessions,

    /// Delete every turn in a session.
    Clear {
        /// Session to clear.
        #[arg(long)]
        session: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_turns_list_flags() {
        let cli = Cli::try_parse_from([
            "banter", "turns", "list", "--session", "abc", "--search", "rust", "--limit", "5", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Turns {
                command: TurnsCommand::List { session, search, limit },
            } => {
                assert_eq!(session.as_deref(), Some("abc"));
                assert_eq!(search.as_deref(), Some("rust"));
                assert_eq!(limit, 5);
            }
            _ => panic!("expected turns list"),
        }
    }

    #[test]
    fn turns_clear_requires_session() {
        assert!(Cli::try_parse_from(["banter", "turns", "clear"]).is_err());
    }
}
