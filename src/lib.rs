//! repohub - A multi-user source-code repository host.
//!
//! Repositories hold a mutable working set of files, an immutable commit
//! history, named branches, collaborator grants and optional on-chain anchors.
//! A global ledger of governance proposals sits alongside them.

pub mod access;
pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod proposals;
pub mod repo;
pub mod repository;
pub mod store;
pub mod util;

pub use app::{App, AppError};
pub use repo::RepoError;
pub use repository::{NewRepository, Principal, Repository};
pub use store::RepositoryStore;
