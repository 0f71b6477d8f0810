//! Top-level application component.
//!
//! The [`App`] is the serializing execution boundary around the
//! [`RepositoryStore`]. Mutations take the write half of an async RwLock, run
//! to completion and are persisted before the lock is released; reads share
//! the read half and hand back owned copies, so they never observe a
//! partially applied mutation.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::backend::{BackendError, FsBackend, MemoryBackend, StateBackend};
use crate::config::ConfigHelper;
use crate::repo::{self, RepoError};
use crate::repository::{
    from_json, ChainMetadata, Commit, CommitId, CommitMetadata, FileEntry, JsonError,
    NewRepository, Principal, Proposal, ProposalId, Repository, RepositoryId,
};
use crate::store::{RepositoryStore, StoreState};
use crate::util::{Clock, IdSource, SystemClock, UuidIdSource};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// The core rejected the call.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Loading or saving the snapshot failed.
    #[error("state backend error: {0}")]
    Backend(#[from] BackendError),

    /// The snapshot could not be encoded or decoded.
    #[error("state snapshot error: {0}")]
    Snapshot(String),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Snapshot(e.to_string())
    }
}

impl From<JsonError> for AppError {
    fn from(e: JsonError) -> Self {
        AppError::Snapshot(e.to_string())
    }
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
///
/// Owns the configuration, the state backend and the single repository store.
pub struct App {
    config: ConfigHelper,
    backend: Arc<dyn StateBackend>,
    store: RwLock<SyncedStore>,
}

/// The store together with the snapshot bytes it was last loaded from or
/// saved as.
struct SyncedStore {
    store: RepositoryStore,
    snapshot: Option<Vec<u8>>,
}

/// Decode a snapshot; no snapshot means an empty store.
fn decode_state(snapshot: Option<&[u8]>) -> Result<StoreState> {
    match snapshot {
        Some(bytes) => Ok(from_json(bytes)?),
        None => Ok(StoreState::default()),
    }
}

impl App {
    /// Create an App from configuration, choosing the backend it names.
    pub async fn from_config(config: ConfigHelper) -> Result<Self> {
        let backend: Arc<dyn StateBackend> = match config.state_path() {
            Some(path) => Arc::new(FsBackend::new(path)),
            None => Arc::new(MemoryBackend::new()),
        };
        Self::with_backend(
            config,
            backend,
            Arc::new(SystemClock),
            Arc::new(UuidIdSource),
        )
        .await
    }

    /// Create an App over an explicit backend, clock and id source.
    ///
    /// Resumes from the backend's snapshot if it holds one.
    pub async fn with_backend(
        config: ConfigHelper,
        backend: Arc<dyn StateBackend>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
    ) -> Result<Self> {
        let snapshot = backend.load().await?;
        let state = decode_state(snapshot.as_deref())?;
        tracing::debug!(repositories = state.repositories.len(), "store state loaded");

        let store = RepositoryStore::from_state(state, config.store_settings(), clock, ids);
        Ok(Self {
            config,
            backend,
            store: RwLock::new(SyncedStore { store, snapshot }),
        })
    }

    /// Get the configuration helper.
    pub fn config(&self) -> &ConfigHelper {
        &self.config
    }

    /// Run one mutation to completion and persist the result.
    ///
    /// The backend lock is held from the reload to the save, so mutations from
    /// other processes sharing the snapshot are applied first, never
    /// overwritten. If persisting fails the in-memory state goes back to the
    /// last saved snapshot, so a failed call never leaves a change behind.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut RepositoryStore) -> repo::Result<T>,
    ) -> Result<T> {
        let mut synced = self.store.write().await;
        let _lock = self.backend.lock().await?;

        let latest = self.backend.load().await?;
        if latest != synced.snapshot {
            tracing::debug!("snapshot changed by another writer, reloading");
            let state = decode_state(latest.as_deref())?;
            synced.store.replace_state(state);
            synced.snapshot = latest;
        }

        let value = op(&mut synced.store)?;

        let saved = match serde_json::to_vec(synced.store.state()) {
            Ok(bytes) => match self.backend.save(&bytes).await {
                Ok(()) => Ok(bytes),
                Err(e) => Err(AppError::from(e)),
            },
            Err(e) => Err(AppError::from(e)),
        };
        match saved {
            Ok(bytes) => {
                synced.snapshot = Some(bytes);
                Ok(value)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to persist store state, rolling back");
                match decode_state(synced.snapshot.as_deref()) {
                    Ok(state) => synced.store.replace_state(state),
                    Err(restore) => {
                        tracing::error!(error = %restore, "failed to restore last snapshot")
                    }
                }
                Err(e)
            }
        }
    }

    /// Run one read against a consistent view of the store.
    async fn read<T>(&self, op: impl FnOnce(&RepositoryStore) -> repo::Result<T>) -> Result<T> {
        let synced = self.store.read().await;
        Ok(op(&synced.store)?)
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    pub async fn create_repository(
        &self,
        caller: &Principal,
        spec: NewRepository,
    ) -> Result<RepositoryId> {
        self.mutate(|s| s.create_repository(caller, spec)).await
    }

    pub async fn delete_repository(&self, caller: &Principal, id: &str) -> Result<()> {
        self.mutate(|s| s.delete_repository(caller, id)).await
    }

    pub async fn get_repository(&self, caller: &Principal, id: &str) -> Result<Repository> {
        self.read(|s| s.get_repository(caller, id).cloned()).await
    }

    pub async fn add_collaborator(
        &self,
        caller: &Principal,
        id: &str,
        principal: &Principal,
    ) -> Result<()> {
        self.mutate(|s| s.add_collaborator(caller, id, principal)).await
    }

    pub async fn get_user_repositories(&self, caller: &Principal) -> Result<Vec<Repository>> {
        self.read(|s| {
            Ok(s.get_user_repositories(caller)
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    pub async fn get_collaborator_repositories(
        &self,
        caller: &Principal,
    ) -> Result<Vec<Repository>> {
        self.read(|s| {
            Ok(s.get_collaborator_repositories(caller)
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    // =========================================================================
    // Files
    // =========================================================================

    pub async fn upload_file(
        &self,
        caller: &Principal,
        id: &str,
        path: &str,
        content: Vec<u8>,
    ) -> Result<()> {
        self.mutate(|s| s.upload_file(caller, id, path, content)).await
    }

    pub async fn delete_file(&self, caller: &Principal, id: &str, path: &str) -> Result<()> {
        self.mutate(|s| s.delete_file(caller, id, path)).await
    }

    pub async fn get_file(
        &self,
        caller: &Principal,
        id: &str,
        path: &str,
    ) -> Result<Option<FileEntry>> {
        self.read(|s| Ok(s.get_file(caller, id, path)?.cloned())).await
    }

    pub async fn list_files(&self, caller: &Principal, id: &str) -> Result<Vec<String>> {
        self.read(|s| s.list_files(caller, id)).await
    }

    // =========================================================================
    // Commits
    // =========================================================================

    pub async fn commit_changes(
        &self,
        caller: &Principal,
        id: &str,
        message: &str,
    ) -> Result<CommitId> {
        self.mutate(|s| s.commit_changes(caller, id, message)).await
    }

    pub async fn get_commit(
        &self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
    ) -> Result<Option<Commit>> {
        self.read(|s| Ok(s.get_commit(caller, id, commit_id)?.cloned())).await
    }

    pub async fn get_commit_file_content(
        &self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
        path: &str,
    ) -> Result<Option<FileEntry>> {
        self.read(|s| {
            let file = s.get_commit_file_content(caller, id, commit_id, path)?;
            Ok(file.cloned())
        })
        .await
    }

    pub async fn list_commits(&self, caller: &Principal, id: &str) -> Result<Vec<Commit>> {
        self.read(|s| Ok(s.list_commits(caller, id)?.to_vec())).await
    }

    pub async fn list_branch_commits(
        &self,
        caller: &Principal,
        id: &str,
        branch: &str,
    ) -> Result<Vec<Commit>> {
        self.read(|s| {
            Ok(s.list_branch_commits(caller, id, branch)?
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    // =========================================================================
    // Branches
    // =========================================================================

    pub async fn create_branch(
        &self,
        caller: &Principal,
        id: &str,
        new_name: &str,
        from: &str,
    ) -> Result<()> {
        self.mutate(|s| s.create_branch(caller, id, new_name, from)).await
    }

    pub async fn switch_branch(&self, caller: &Principal, id: &str, name: &str) -> Result<()> {
        self.mutate(|s| s.switch_branch(caller, id, name)).await
    }

    pub async fn list_branches(&self, caller: &Principal, id: &str) -> Result<Vec<String>> {
        self.read(|s| s.list_branches(caller, id)).await
    }

    pub async fn get_current_branch(&self, caller: &Principal, id: &str) -> Result<Option<String>> {
        self.read(|s| Ok(s.get_current_branch(caller, id)?.map(str::to_string))).await
    }

    // =========================================================================
    // Chain anchors
    // =========================================================================

    pub async fn anchor_commit(
        &self,
        caller: &Principal,
        id: &str,
        commit_id: &str,
        chain: ChainMetadata,
    ) -> Result<()> {
        self.mutate(|s| s.anchor_commit(caller, id, commit_id, chain)).await
    }

    pub async fn list_chain_metadata(
        &self,
        caller: &Principal,
        id: &str,
    ) -> Result<Vec<CommitMetadata>> {
        self.read(|s| Ok(s.list_chain_metadata(caller, id)?.to_vec())).await
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    pub async fn create_proposal(
        &self,
        caller: &Principal,
        id: &str,
        message: &str,
    ) -> Result<ProposalId> {
        self.mutate(|s| s.create_proposal(caller, id, message)).await
    }

    pub async fn approve_proposal(
        &self,
        caller: &Principal,
        proposal_id: ProposalId,
    ) -> Result<()> {
        self.mutate(|s| s.approve_proposal(caller, proposal_id)).await
    }

    pub async fn list_proposals(&self, caller: &Principal) -> Result<Vec<Proposal>> {
        self.read(|s| Ok(s.list_proposals(caller).into_iter().cloned().collect())).await
    }
}
