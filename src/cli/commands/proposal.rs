//! Proposal subcommands.

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::repository::ProposalId;

/// Proposal subcommands.
#[derive(Subcommand, Debug)]
pub enum ProposalCommand {
    /// File a proposal against a repository.
    Create(CreateArgs),

    /// List the proposals visible to the caller.
    List(ListArgs),

    /// Approve a proposal (repository owner only).
    Approve(ApproveArgs),
}

impl ProposalCommand {
    /// Run the proposal subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        match self {
            ProposalCommand::Create(args) => {
                let id = app
                    .create_proposal(&caller, &args.repo_id, &args.message)
                    .await?;
                if global.json {
                    args.output
                        .write_json(&serde_json::json!({ "id": id }))
                        .await?;
                } else {
                    args.output.write_str(&id.to_string()).await?;
                }
            }
            ProposalCommand::List(args) => {
                let proposals = app.list_proposals(&caller).await?;
                if global.json {
                    args.output.write_json(&proposals).await?;
                } else {
                    let lines = proposals.iter().map(|p| {
                        let status = if p.approved { "approved" } else { "open" };
                        format!(
                            "{}\t{}\t{}\t{}\t{}",
                            p.id, p.repository_id, p.proposer, status, p.message
                        )
                    });
                    args.output.write_lines(lines).await?;
                }
            }
            ProposalCommand::Approve(args) => {
                app.approve_proposal(&caller, args.proposal_id).await?;
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

    /// What the proposal asks for.
    #[arg(short, long)]
    pub message: String,

    #[command(flatten)]
    pub output: OutputSink,
}

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub output: OutputSink,
}

/// Arguments for the approve command.
#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Proposal id.
    pub proposal_id: ProposalId,
}
