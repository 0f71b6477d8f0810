//! Working-set file subcommands.

use clap::{Args, Subcommand};

use crate::app::App;
use crate::cli::{CliError, GlobalArgs, InputSource, OutputSink, Result};

// =============================================================================
// File Subcommands
// =============================================================================

/// File subcommands.
#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Create or overwrite a file in the working set.
    Upload(UploadArgs),

    /// Print a file's current content.
    Get(GetArgs),

    /// Remove a file from the working set.
    Delete(DeleteArgs),

    /// List working-set paths.
    List(ListArgs),
}

impl FileCommand {
    /// Run the file subcommand.
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        match self {
            FileCommand::Upload(args) => args.run(app, global).await,
            FileCommand::Get(args) => args.run(app, global).await,
            FileCommand::Delete(args) => args.run(app, global).await,
            FileCommand::List(args) => args.run(app, global).await,
        }
    }
}

// =============================================================================
// Upload
// =============================================================================

/// Arguments for the upload command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Repository id.
    pub repo_id: String,

    /// Path of the file within the repository.
    pub path: String,

    /// Inline content. Read from --input-file or stdin when omitted.
    pub content: Option<String>,

    #[command(flatten)]
    pub input: InputSource,
}

impl UploadArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let content = self.input.read_bytes(self.content.as_deref()).await?;
        app.upload_file(&caller, &self.repo_id, &self.path, content).await?;
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

    /// Path of the file within the repository.
    pub path: String,

    #[command(flatten)]
    pub output: OutputSink,
}

impl GetArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let entry = app
            .get_file(&caller, &self.repo_id, &self.path)
            .await?
            .ok_or_else(|| CliError::Other(format!("file not found: {}", self.path)))?;

        if global.json {
            self.output.write_json(&entry).await?;
        } else {
            self.output.write_bytes(&entry.content).await?;
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

    /// Path of the file within the repository.
    pub path: String,
}

impl DeleteArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        app.delete_file(&caller, &self.repo_id, &self.path).await?;
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

    #[command(flatten)]
    pub output: OutputSink,
}

impl ListArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let caller = global.caller()?;
        let paths = app.list_files(&caller, &self.repo_id).await?;
        if global.json {
            self.output.write_json(&paths).await?;
        } else {
            self.output.write_lines(&paths).await?;
        }
        Ok(())
    }
}
