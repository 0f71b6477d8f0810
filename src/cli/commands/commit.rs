//! Commit and chain-anchor subcommands.

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{CliError, GlobalArgs, OutputSink, Result};
use crate::repository::{ChainMetadata, Commit};

// =============================================================================
// Commit Subcommands
// =============================================================================

/// Commit subcommands.
#[derive(Subcommand, Debug)]
pub enum CommitCommand {
    /// Snapshot the working set onto the current branch.
    Create(CreateArgs),

    /// Show a commit.
    Get(GetArgs),

    /// List commits, either all of them or one branch's.
    List(ListArgs),

    /// Print a file as it was recorded in a commit.
    File(FileArgs),

    /// Record on-chain transaction references for a commit.
    Anchor(AnchorArgs),

    /// List recorded chain anchors.
    Anchors(AnchorsArgs),
}

impl CommitCommand {
    /// Run the commit subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            CommitCommand::Create(args) => args.run(app, global).await,
            CommitCommand::Get(args) => args.run(app, global).await,
            CommitCommand::List(args) => args.run(app, global).await,
            CommitCommand::File(args) => args.run(app, global).await,
            CommitCommand::Anchor(args) => args.run(app, global).await,
            CommitCommand::Anchors(args) => args.run(app, global).await,
        }
    }
}

fn one_line(commit: &Commit) -> String {
    let first = commit.message.lines().next().unwrap_or("");
    format!("{} {}", commit.id, first)
}

// =============================================================================
// Create
// =============================================================================

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository id.
    pub repo_id: String,

    /// Commit message.
    #[arg(short, long)]
    pub message: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl CreateArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let id = app
            .commit_changes(&caller, &self.repo_id, &self.message)
            .await?;
        if global.json {
            self.output
                .write_json(&serde_json::json!({ "id": id }))
                .await?;
        } else {
            self.output.write_str(&id).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Get
// =============================================================================

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Repository id.
    pub repo_id: String,

    /// Commit id.
    pub commit_id: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl GetArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let commit = app
            .get_commit(&caller, &self.repo_id, &self.commit_id)
            .await?
            .ok_or_else(|| CliError::Other(format!("commit not found: {}", self.commit_id)))?;

        if global.json {
            return Ok(self.output.write_json(&commit).await?);
        }

        let mut lines = vec![
            format!("commit {}", commit.id),
            format!("timestamp {}", commit.timestamp),
            String::new(),
        ];
        lines.extend(commit.message.lines().map(|l| format!("    {}", l)));
        lines.push(String::new());
        lines.extend(
            commit
                .files
                .iter()
                .map(|f| format!("{} {}", f.hash, f.path)),
        );
        self.output.write_lines(lines).await?;
        Ok(())
    }
}

// =============================================================================
// List
// =============================================================================

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Repository id.
    pub repo_id: String,

    /// Only list commits reachable from this branch.
    #[arg(long)]
    pub branch: Option<String>,

    #[command(flatten)]
    pub output: OutputSink,
}

impl ListArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let commits = match &self.branch {
            Some(branch) => app.list_branch_commits(&caller, &self.repo_id, branch).await?,
            None => app.list_commits(&caller, &self.repo_id).await?,
        };

        if global.json {
            self.output.write_json(&commits).await?;
        } else {
            self.output.write_lines(commits.iter().map(one_line)).await?;
        }
        Ok(())
    }
}

// =============================================================================
// File
// =============================================================================

/// Arguments for the file command.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Repository id.
    pub repo_id: String,

    /// Commit id.
    pub commit_id: String,

    /// Path of the file within the commit.
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl FileArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let entry = app
            .get_commit_file_content(&caller, &self.repo_id, &self.commit_id, &self.path)
            .await?
            .ok_or_else(|| {
                CliError::Other(format!(
                    "file {} not found in commit {}",
                    self.path, self.commit_id
                ))
            })?;

        if global.json {
            self.output.write_json(&entry).await?;
        } else {
            self.output.write_bytes(&entry.content).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Anchor
// =============================================================================

/// Arguments for the anchor command.
#[derive(Args, Debug)]
pub struct AnchorArgs {
    /// Repository id.
    pub repo_id: String,

    /// Commit id.
    pub commit_id: String,

    /// Ethereum transaction reference.
    #[arg(long)]
    pub eth_tx: Option<String>,

    /// Bitcoin transaction reference.
    #[arg(long)]
    pub btc_tx: Option<String>,
}

impl AnchorArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let chain = ChainMetadata {
            eth_tx: self.eth_tx,
            btc_tx: self.btc_tx,
        };
        app.anchor_commit(&caller, &self.repo_id, &self.commit_id, chain).await?;
        Ok(())
    }
}

// =============================================================================
// Anchors
// =============================================================================

/// Arguments for the anchors command.
#[derive(Args, Debug)]
pub struct AnchorsArgs {
    /// Repository id.
    pub repo_id: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl AnchorsArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let anchors = app.list_chain_metadata(&caller, &self.repo_id).await?;

        if global.json {
            return Ok(self.output.write_json(&anchors).await?);
        }

        let lines = anchors.iter().map(|a| {
            let mut line = a.commit_id.clone();
            if let Some(tx) = &a.chain.eth_tx {
                line.push_str(&format!(" eth={}", tx));
            }
            if let Some(tx) = &a.chain.btc_tx {
                line.push_str(&format!(" btc={}", tx));
            }
            line
        });
        self.output.write_lines(lines).await?;
        Ok(())
    }
}
