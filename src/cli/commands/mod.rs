//! Subcommand implementations, one module per command group.

pub mod branch;
pub mod commit;
pub mod file;
pub mod proposal;
pub mod repo;
