//! Repository subcommands.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::App;
use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::repository::{NewRepository, Principal, Repository};

// =============================================================================
// Repo Subcommands
// =============================================================================

/// Repository subcommands.
#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Create a repository owned by the caller.
    Create(CreateArgs),

    /// Delete a repository (owner only).
    Delete(DeleteArgs),

    /// Show a repository.
    Get(GetArgs),

    /// Grant another principal write access (owner only).
    #[command(name = "add-collaborator")]
    AddCollaborator(AddCollaboratorArgs),

    /// List repositories owned by the caller.
    #[command(name = "list-owned")]
    ListOwned(ListArgs),

    /// List repositories the caller collaborates on.
    #[command(name = "list-collaborating")]
    ListCollaborating(ListArgs),
}

impl RepoCommand {
    /// Run the repo subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            RepoCommand::Create(args) => args.run(app, global).await,
            RepoCommand::Delete(args) => args.run(app, global).await,
            RepoCommand::Get(args) => args.run(app, global).await,
            RepoCommand::AddCollaborator(args) => args.run(app, global).await,
            RepoCommand::ListOwned(args) => {
                let caller = global.caller()?;
                let repos = app.get_user_repositories(&caller).await?;
                args.write(&repos, global).await
            }
            RepoCommand::ListCollaborating(args) => {
                let caller = global.caller()?;
                let repos = app.get_collaborator_repositories(&caller).await?;
                args.write(&repos, global).await
            }
        }
    }
}

/// Short listing entry for a repository.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepositorySummary<'a> {
    id: &'a str,
    name: &'a str,
    owner: &'a Principal,
    is_private: bool,
}

impl<'a> From<&'a Repository> for RepositorySummary<'a> {
    fn from(repo: &'a Repository) -> Self {
        Self {
            id: &repo.id,
            name: &repo.name,
            owner: &repo.owner,
            is_private: repo.is_private,
        }
    }
}

// =============================================================================
// Create
// =============================================================================

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository name.
    pub name: String,

    /// Free-form description.
    #[arg(long)]
    pub description: Option<String>,

    /// Hide the repository from non-members.
    #[arg(long)]
    pub private: bool,

    #[command(flatten)]
    pub output: OutputSink,
}

impl CreateArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let mut spec = NewRepository::new(self.name).with_private(self.private);
        if let Some(description) = self.description {
            spec = spec.with_description(description);
        }

        let id = app.create_repository(&caller, spec).await?;
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
// Delete
// =============================================================================

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Repository id.
    pub repo_id: String,
}

impl DeleteArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        app.delete_repository(&caller, &self.repo_id).await?;
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

    #[command(flatten)]
    pub output: OutputSink,
}

impl GetArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let repo = app.get_repository(&caller, &self.repo_id).await?;

        if global.json {
            return Ok(self.output.write_json(&repo).await?);
        }

        let collaborators = repo
            .collaborators
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let description = repo.description.as_deref().unwrap_or("");
        let lines = [
            format!("id:             {}", repo.id),
            format!("name:           {}", repo.name),
            format!("description:    {}", description),
            format!("owner:          {}", repo.owner),
            format!("collaborators:  {}", collaborators),
            format!("private:        {}", repo.is_private),
            format!("current branch: {}", repo.current_branch),
            format!("branches:       {}", repo.branches.len()),
            format!("files:          {}", repo.files.len()),
            format!("commits:        {}", repo.commits.len()),
        ];
        self.output.write_lines(lines).await?;
        Ok(())
    }
}

// =============================================================================
// Add Collaborator
// =============================================================================

/// Arguments for the add-collaborator command.
#[derive(Args, Debug)]
pub struct AddCollaboratorArgs {
    /// Repository id.
    pub repo_id: String,

    /// Principal to add.
    pub principal: String,
}

impl AddCollaboratorArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        app.add_collaborator(&caller, &self.repo_id, &Principal::new(self.principal))
            .await?;
        Ok(())
    }
}

// =============================================================================
// Listings
// =============================================================================

/// Arguments shared by the listing commands.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub output: OutputSink,
}

impl ListArgs {
    async fn write(&self, repos: &[Repository], global: &GlobalArgs) -> Result<()> {
        let summaries: Vec<RepositorySummary<'_>> = repos.iter().map(Into::into).collect();
        if global.json {
            self.output.write_json(&summaries).await?;
        } else {
            self.output
                .write_lines(summaries.iter().map(|s| format!("{}\t{}", s.id, s.name)))
                .await?;
        }
        Ok(())
    }
}
