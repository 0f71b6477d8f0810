//! Branch subcommands.

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};

/// Branch subcommands.
#[derive(Subcommand, Debug)]
pub enum BranchCommand {
    /// Fork a new branch from an existing one.
    Create(CreateArgs),

    /// Make a branch the target of subsequent commits.
    Switch(SwitchArgs),

    /// List branches; the current one is starred.
    List(ListArgs),

    /// Print the current branch.
    Current(ListArgs),
}

impl BranchCommand {
    /// Run the branch subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        match self {
            BranchCommand::Create(args) => {
                app.create_branch(&caller, &args.repo_id, &args.name, &args.from).await?;
            }
            BranchCommand::Switch(args) => {
                app.switch_branch(&caller, &args.repo_id, &args.name).await?;
            }
            BranchCommand::List(args) => {
                let branches = app.list_branches(&caller, &args.repo_id).await?;
                let current = app.get_current_branch(&caller, &args.repo_id).await?;
                if global.json {
                    args.output
                        .write_json(&serde_json::json!({
                            "branches": branches,
                            "current": current,
                        }))
                        .await?;
                } else {
                    let lines = branches.iter().map(|b| {
                        let marker = if current.as_deref() == Some(b.as_str()) { '*' } else { ' ' };
                        format!("{} {}", marker, b)
                    });
                    args.output.write_lines(lines).await?;
                }
            }
            BranchCommand::Current(args) => {
                let current = app.get_current_branch(&caller, &args.repo_id).await?;
                if global.json {
                    args.output.write_json(&current).await?;
                } else if let Some(name) = current {
                    args.output.write_str(&name).await?;
                }
            }
        }
        Ok(())
    }
}

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository id.
    pub repo_id: String,

    /// Name of the new branch.
    pub name: String,

    /// Branch to fork from.
    #[arg(long)]
    pub from: String,
}

/// Arguments for the switch command.
#[derive(Args, Debug)]
pub struct SwitchArgs {
    /// Repository id.
    pub repo_id: String,

    /// Branch to switch to.
    pub name: String,
}

/// Arguments for the list and current commands.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Repository id.
    pub repo_id: String,

    #[command(flatten)]
    pub output: OutputSink,
}
