//! Command-line interface for repohub.

pub mod args;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::app::{App, AppError};
use crate::config::{read_config, ConfigError, ConfigHelper};

pub use args::{GlobalArgs, InputSource, OutputSink};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] args::ArgsError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// rhub - A multi-user source-code repository host.
#[derive(Parser, Debug)]
#[command(name = "rhub", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Repository lifecycle and membership.
    Repo {
        #[command(subcommand)]
        command: commands::repo::RepoCommand,
    },

    /// Working-set files.
    File {
        #[command(subcommand)]
        command: commands::file::FileCommand,
    },

    /// Commits and chain anchors.
    Commit {
        #[command(subcommand)]
        command: commands::commit::CommitCommand,
    },

    /// Branches.
    Branch {
        #[command(subcommand)]
        command: commands::branch::BranchCommand,
    },

    /// Governance proposals.
    Proposal {
        #[command(subcommand)]
        command: commands::proposal::ProposalCommand,
    },
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let loaded = read_config(&self.global.to_config_source())?;
        let config = ConfigHelper::from(loaded.config);

        init_logging(config.log_filter());
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }

        let app = App::from_config(config).await?;

        match self.command {
            Command::Repo { command } => command.run(&app, &self.global).await,
            Command::File { command } => command.run(&app, &self.global).await,
            Command::Commit { command } => command.run(&app, &self.global).await,
            Command::Branch { command } => command.run(&app, &self.global).await,
            Command::Proposal { command } => command.run(&app, &self.global).await,
        }
    }
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. An unparsable configured
/// filter falls back to `warn`.
fn init_logging(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_command() {
        let cli = Cli::try_parse_from([
            "rhub",
            "--principal",
            "alice",
            "--config",
            "state.persist=false",
            "branch",
            "create",
            "repo-1",
            "feature",
            "--from",
            "main",
        ])
        .unwrap();
        assert_eq!(cli.global.principal.as_deref(), Some("alice"));
        assert_eq!(
            cli.global.config_overrides,
            vec![("state.persist".to_string(), "false".to_string())]
        );
        assert!(matches!(cli.command, Command::Branch { .. }));
    }
}
