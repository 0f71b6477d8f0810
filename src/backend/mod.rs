//! Persistence for the repository store.

mod fs_backend;
mod memory_backend;
mod state_backend;

pub use fs_backend::FsBackend;
pub use memory_backend::MemoryBackend;
pub use state_backend::{BackendError, Result, StateBackend, StateLock};
