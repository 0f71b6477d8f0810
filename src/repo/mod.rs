//! Per-repository engine.
//!
//! The working set, branch graph, commit history and chain anchors of a single
//! [`Repository`](crate::repository::Repository). These operations do no
//! authorization of their own; callers go through
//! [`RepositoryStore`](crate::store::RepositoryStore), which checks access first.

mod branch_graph;
mod chain_anchor;
mod commit_engine;
mod error;
mod file_store;

pub use error::{RepoError, Result};
pub(crate) use error::require_non_empty;
