//! The registry that owns every repository and the proposal ledger.
//!
//! [`RepositoryStore`] is the core-facing surface: each method resolves its
//! target, runs [`require`] and only then delegates to the per-repository
//! engine. All checks finish before anything is written, so a failed call
//! leaves the store unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::access::{authorize, require, Access, Operation};
use crate::proposals::{ProposalLedger, ProposalVisibility};
use crate::repo::{require_non_empty, RepoError, Result};
use crate::repository::{
    ChainMetadata, Commit, CommitId, CommitMetadata, FileEntry, NewRepository, Principal,
    Proposal, ProposalId, Repository, RepositoryId,
};
use crate::util::{Clock, IdSource, SystemClock, UuidIdSource};

/// Name of the branch created with every repository unless configured otherwise.
pub const DEFAULT_BRANCH_NAME: &str = "main";

/// Policy knobs for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub default_branch: String,
    pub proposal_visibility: ProposalVisibility,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH_NAME.to_string(),
            proposal_visibility: ProposalVisibility::default(),
        }
    }
}

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub repositories: BTreeMap<RepositoryId, Repository>,
    pub proposals: ProposalLedger,
}

/// Registry of all repositories, indexed by id.
pub struct RepositoryStore {
    state: StoreState,
    settings: StoreSettings,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl RepositoryStore {
    /// An empty store using wall-clock time and UUID ids.
    pub fn new(settings: StoreSettings) -> Self {
        Self::from_state(
            StoreState::default(),
            settings,
            Arc::new(SystemClock),
            Arc::new(UuidIdSource),
        )
    }

    /// A store resuming from previously persisted state.
    pub fn from_state(
        state: StoreState,
        settings: StoreSettings,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            state,
            settings,
            clock,
            ids,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Swap in a previously captured state wholesale.
    pub(crate) fn replace_state(&mut self, state: StoreState) {
        self.state = state;
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // =========================================================================
    // Resolution helpers
    // =========================================================================

    fn resolve(&self, id: &str) -> Result<&Repository> {
        self.state
            .repositories
            .get(id)
            .ok_or_else(|| RepoError::not_found("repository", id))
    }

    /// Resolve and authorize a read.
    fn readable(&self, caller: &Principal, id: &str) -> Result<&Repository> {
        let repo = self.resolve(id)?;
        require(caller, repo, Operation::Read)?;
        Ok(repo)
    }

    /// Resolve and authorize a mutation.
    fn writable(
        &mut self,
        caller: &Principal,
        id: &str,
        operation: Operation,
    ) -> Result<&mut Repository> {
        let repo = self
            .state
            .repositories
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found("repository", id))?;
        require(caller, repo, operation)?;
        Ok(repo)
    }

    // =========================================================================
    // Repository lifecycle
    // =========================================================================

    /// Create a repository owned by `caller` and return its id.
    pub fn create_repository(
        &mut self,
        caller: &Principal,
        spec: NewRepository,
    ) -> Result<RepositoryId> {
        require_non_empty("name", &spec.name)?;

        let id = self.ids.next_id();
        if self.state.repositories.contains_key(&id) {
            return Err(RepoError::Conflict(format!("repository id '{}' already exists", id)));
        }

        let now = self.clock.now();
        let repo = Repository::new(
            id.clone(),
            caller.clone(),
            spec,
            &self.settings.default_branch,
            now,
        );
        self.state.repositories.insert(id.clone(), repo);

        tracing::info!(repo_id = %id, owner = %caller, "repository created");
        Ok(id)
    }

    /// Remove a repository entirely. Owner only.
    pub fn delete_repository(&mut self, caller: &Principal, id: &str) -> Result<()> {
        self.writable(caller, id, Operation::Administer)?;
        self.state.repositories.remove(id);

        tracing::info!(repo_id = %id, "repository deleted");
        Ok(())
    }

    pub fn get_repository(&self, caller: &Principal, id: &str) -> Result<&Repository> {
        self.readable(caller, id)
    }

    /// Grant `principal` collaborator standing. Owner only; idempotent.
    pub fn add_collaborator(
        &mut self,
        caller: &Principal,
        id: &str,
        principal: &Principal,
    ) -> Result<()> {
        let now = self.clock.now();
        let repo = self.writable(caller, id, Operation::Administer)?;
        if repo.is_member(principal) {
            return Ok(());
        }
        repo.collaborators.insert(principal.clone());
        repo.touch(now);

        tracing::info!(repo_id = %id, collaborator = %principal, "collaborator added");
        Ok(())
    }

    /// Repositories owned by `caller`.
    pub fn get_user_repositories(&self, caller: &Principal) -> Vec<&Repository> {
        self.state
            .repositories
            .values()
            .filter(|r| r.is_owner(caller))
            .collect()
    }

    /// Repositories where `caller` is an explicit collaborator.
    pub fn get_collaborator_repositories(&self, caller: &Principal) -> Vec<&Repository> {
        self.state
            .repositories
            .values()
            .filter(|r| r.collaborators.contains(caller))
            .collect()
    }

    // =========================================================================
    // Files
    // =========================================================================

    pub fn upload_file(
        &mut self,
        caller: &Principal,
        id: &str,
        path: &str,
        content: Vec<u8>,
    ) -> Result<()> {
        let now = self.clock.now();
        self.writable(caller, id, Operation::Write)?.upload_file(path, content, now)?;
        Ok(())
    }

    pub fn delete_file(&mut self, caller: &Principal, id: &str, path: &str) -> Result<()> {
        let now = self.clock.now();
        self.writable(caller, id, Operation::Write)?.delete_file(path, now)?;
        Ok(())
    }

    pub fn get_file(&self, caller: &Principal, id: &str, path: &str) -> Result<Option<&FileEntry>> {
        Ok(self.readable(caller, id)?.get_file(path))
    }

    pub fn list_files(&self, caller: &Principal, id: &str) -> Result<Vec<String>> {
        Ok(self.readable(caller, id)?.list_files())
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Snapshot the working set onto the current branch; returns the commit id.
    pub fn commit_changes(
        &mut self,
        caller: &Principal,
        id: &str,
        message: &str,
    ) -> Result<CommitId> {
        let now = self.clock.now();
        let commit = self
            .writable(caller, id, Operation::Write)?
            .commit_changes(message, now)?;
        Ok(commit.id.clone())
    }

    pub fn get_commit(
        &self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
    ) -> Result<Option<&Commit>> {
        Ok(self.readable(caller, id)?.get_commit(commit_id))
    }

    pub fn get_commit_file_content(
        &self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
        path: &str,
    ) -> Result<Option<&FileEntry>> {
        Ok(self
            .readable(caller, id)?
            .get_commit_file_content(commit_id, path))
    }

    pub fn list_commits(&self, caller: &Principal, id: &str) -> Result<&[Commit]> {
        Ok(self.readable(caller, id)?.list_commits())
    }

    pub fn list_branch_commits(
        &self,
        caller: &Principal,
        id: &str,
        branch: &str,
    ) -> Result<Vec<&Commit>> {
        self.readable(caller, id)?.branch_commits(branch)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    pub fn create_branch(
        &mut self,
        caller: &Principal,
        id: &str,
        new_name: &str,
        from: &str,
    ) -> Result<()> {
        let now = self.clock.now();
        self.writable(caller, id, Operation::Write)?.create_branch(new_name, from, now)
    }

    pub fn switch_branch(&mut self, caller: &Principal, id: &str, name: &str) -> Result<()> {
        let now = self.clock.now();
        self.writable(caller, id, Operation::Write)?.switch_branch(name, now)
    }

    pub fn list_branches(&self, caller: &Principal, id: &str) -> Result<Vec<String>> {
        Ok(self.readable(caller, id)?.list_branches())
    }

    pub fn get_current_branch(&self, caller: &Principal, id: &str) -> Result<Option<&str>> {
        Ok(self.readable(caller, id)?.get_current_branch())
    }

    // =========================================================================
    // Chain anchors
    // =========================================================================

    pub fn anchor_commit(
        &mut self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
        chain: ChainMetadata,
    ) -> Result<()> {
        let now = self.clock.now();
        self.writable(caller, id, Operation::Write)?.anchor_commit(commit_id, chain, now)
    }

    pub fn list_chain_metadata(&self, caller: &Principal, id: &str) -> Result<&[CommitMetadata]> {
        Ok(&self.readable(caller, id)?.chain_metadata)
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    /// File a proposal against a repository the caller can see.
    pub fn create_proposal(
        &mut self,
        caller: &Principal,
        id: &str,
        message: &str,
    ) -> Result<ProposalId> {
        let repository_id = self.readable(caller, id)?.id.clone();
        let now = self.clock.now();
        let proposal_id = self
            .state
            .proposals
            .create(&repository_id, caller, message, now)?;

        tracing::info!(
            repo_id = %id,
            proposal = proposal_id,
            proposer = %caller,
            "proposal created"
        );
        Ok(proposal_id)
    }

    /// Approve a proposal. Only the owner of its repository may do this.
    pub fn approve_proposal(&mut self, caller: &Principal, proposal_id: ProposalId) -> Result<()> {
        let proposal = self
            .state
            .proposals
            .get(proposal_id)
            .ok_or_else(|| RepoError::not_found("proposal", proposal_id))?;
        let repo = self.resolve(&proposal.repository_id)?;
        require(caller, repo, Operation::Administer)?;

        self.state.proposals.approve(proposal_id)?;

        tracing::info!(proposal = proposal_id, approver = %caller, "proposal approved");
        Ok(())
    }

    /// Proposals visible to `caller` under the configured policy, in id order.
    pub fn list_proposals(&self, caller: &Principal) -> Vec<&Proposal> {
        let visibility = self.settings.proposal_visibility;
        self.state
            .proposals
            .iter()
            .filter(|p| match visibility {
                ProposalVisibility::Global => true,
                ProposalVisibility::Readable => self
                    .state
                    .repositories
                    .get(&p.repository_id)
                    .is_some_and(|r| authorize(caller, r, Operation::Read) == Access::Allow),
            })
            .collect()
    }
}
