//! Repository data model.

mod content_hash;
mod repo_objects;

pub use content_hash::hash_content;
pub use repo_objects::{
    from_json, to_canonical_json, Branch, ChainMetadata, Commit, CommitId, CommitMetadata,
    FileEntry, JsonError, JsonResult, NewRepository, Principal, Proposal, ProposalId, Repository,
    RepositoryId, Timestamp,
};
