//! Repository object types for the repohub engine.
//!
//! This module defines every record a repository owns or references: the
//! working-set [`FileEntry`], immutable [`Commit`] snapshots, [`Branch`]
//! histories, chain anchors and governance [`Proposal`]s. All types serialize
//! with camelCase keys so snapshots and `--json` output share one shape.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Timestamp in nanoseconds of a fixed-resolution clock.
pub type Timestamp = u64;

/// Commit id: a sha-256 hash represented as a lowercase hexadecimal string.
pub type CommitId = String;

/// Repository id, allocated at creation and never reused.
pub type RepositoryId = String;

/// Proposal id, strictly increasing across the whole store.
pub type ProposalId = u64;

// =============================================================================
// Principal
// =============================================================================

/// The caller identity, as supplied by the external identity layer.
///
/// The core treats a principal as authoritative and unforgeable; it only ever
/// compares principals for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// FileEntry
// =============================================================================

/// A path-keyed file record: current bytes plus their digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Path of the file, unique within a working set or snapshot.
    pub path: String,
    /// Raw file content.
    #[serde(with = "hex::serde")]
    pub content: Vec<u8>,
    /// Digest of `content`, see [`super::hash_content`].
    pub hash: String,
    /// Time of the last write to this path.
    pub last_modified: Timestamp,
}

// =============================================================================
// Commit
// =============================================================================

/// An immutable snapshot of every file in the working set at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub timestamp: Timestamp,
    /// Snapshot of the working set, ordered by path.
    pub files: Vec<FileEntry>,
}

impl Commit {
    /// Look up a file as recorded in this snapshot.
    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }
}

// =============================================================================
// Branch
// =============================================================================

/// A named, independently evolving sequence of commits.
///
/// The commits themselves live in the repository's flat history; a branch
/// records the ids of the commits that belong to it, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub commits: Vec<CommitId>,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commits: vec![],
        }
    }

    /// Id of the newest commit on this branch, if any.
    pub fn head(&self) -> Option<&CommitId> {
        self.commits.last()
    }
}

// =============================================================================
// Chain metadata
// =============================================================================

/// External-ledger transaction references. Neither is ever verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_tx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btc_tx: Option<String>,
}

impl ChainMetadata {
    /// True if neither reference carries a value.
    pub fn is_empty(&self) -> bool {
        let blank = |tx: &Option<String>| tx.as_deref().map_or(true, |t| t.trim().is_empty());
        blank(&self.eth_tx) && blank(&self.btc_tx)
    }
}

/// Associates a commit with its chain references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMetadata {
    pub commit_id: CommitId,
    pub chain: ChainMetadata,
}

// =============================================================================
// Repository
// =============================================================================

/// The top-level versioned container.
///
/// `current_branch` always names an entry of `branches`, and `branches` is
/// never empty; both are established by [`Repository::new`] and preserved by
/// every operation in [`crate::repo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: RepositoryId,
    pub owner: Principal,
    /// Explicitly added collaborators. The owner is implied.
    pub collaborators: BTreeSet<Principal>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_private: bool,
    /// Current working set, keyed (and therefore listed) by path.
    pub files: BTreeMap<String, FileEntry>,
    /// Branches in creation order.
    pub branches: Vec<Branch>,
    pub current_branch: String,
    /// Every commit ever made, across all branches, in creation order.
    pub commits: Vec<Commit>,
    /// Append-only chain anchors keyed by commit id.
    pub chain_metadata: Vec<CommitMetadata>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Parameters for creating a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
}

impl NewRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_private: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

impl Repository {
    /// Build a fresh repository with one empty default branch.
    pub fn new(
        id: RepositoryId,
        owner: Principal,
        spec: NewRepository,
        default_branch: &str,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            collaborators: BTreeSet::new(),
            name: spec.name,
            description: spec.description,
            is_private: spec.is_private,
            files: BTreeMap::new(),
            branches: vec![Branch::new(default_branch)],
            current_branch: default_branch.to_string(),
            commits: vec![],
            chain_metadata: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.owner == *principal
    }

    /// Owner or explicit collaborator.
    pub fn is_member(&self, principal: &Principal) -> bool {
        self.is_owner(principal) || self.collaborators.contains(principal)
    }

    /// Advance `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = self.updated_at.max(now);
    }
}

// =============================================================================
// Proposal
// =============================================================================

/// A governance record expressing intent to change a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    /// Non-owning reference; the repository may have been deleted since.
    pub repository_id: RepositoryId,
    pub proposer: Principal,
    pub message: String,
    pub timestamp: Timestamp,
    pub approved: bool,
}

// =============================================================================
// JSON Conversion Functions
// =============================================================================

/// Error type for JSON operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("JSON serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("JSON deserialization error: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Result type for JSON operations.
pub type JsonResult<T> = std::result::Result<T, JsonError>;

/// Deserialize an object from JSON bytes.
pub fn from_json<T: for<'de> Deserialize<'de>>(json: &[u8]) -> JsonResult<T> {
    serde_json::from_slice(json).map_err(JsonError::Deserialize)
}

/// Serialize an object to canonical JSON (RFC 8785).
///
/// No whitespace, object keys sorted lexicographically. Used wherever bytes
/// feed a hash, so equal values always hash equally.
pub fn to_canonical_json<T: Serialize>(value: &T) -> JsonResult<Vec<u8>> {
    serde_json_canonicalizer::to_vec(value).map_err(JsonError::Serialize)
}
