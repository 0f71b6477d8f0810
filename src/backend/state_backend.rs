use async_trait::async_trait;
use fslock::LockFile;

/// Error type for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A custom error message.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Exclusive hold on a backend's snapshot, released on drop.
///
/// While it is held no other writer, in this process or another, can run its
/// own load-modify-save cycle against the same snapshot.
pub struct StateLock {
    _file: Option<LockFile>,
}

impl StateLock {
    /// A lock for snapshots that only ever live in this process.
    pub fn process_local() -> Self {
        Self { _file: None }
    }

    /// A lock backed by an advisory lock on a file.
    pub fn file(file: LockFile) -> Self {
        Self { _file: Some(file) }
    }
}

/// Durable home for the serialized store.
///
/// A backend holds exactly one snapshot. Implementations must replace it
/// atomically: after `save` returns, `load` yields either the old or the new
/// bytes, never a mix.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the current snapshot, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the current snapshot.
    async fn save(&self, data: &[u8]) -> Result<()>;

    /// Wait for exclusive write access to the snapshot.
    ///
    /// Backends whose snapshot is shared between processes must override this.
    async fn lock(&self) -> Result<StateLock> {
        Ok(StateLock::process_local())
    }
}
