use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fslock::LockFile;
use tokio::fs;

use super::state_backend::{BackendError, Result, StateBackend, StateLock};

/// Counter for generating unique temp file names.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A filesystem-based implementation of `StateBackend`.
///
/// The snapshot lives in a single file. Writes are atomic: data is written to
/// a temp file next to it, then renamed over it. Writers coordinate through an
/// advisory lock on a sibling `.lock` file.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    /// Create a new filesystem backend storing its snapshot at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string())
    }

    /// Generate a unique temp file path in the snapshot's directory.
    fn temp_file_path(&self) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        self.path.with_file_name(format!(".{}.tmp.{}.{}", self.file_name(), pid, counter))
    }

    /// Path of the lock file guarding the snapshot.
    fn lock_file_path(&self) -> PathBuf {
        self.path.with_file_name(format!(".{}.lock", self.file_name()))
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StateBackend for FsBackend {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(e)),
        }
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        self.ensure_parent_dir().await?;

        let temp_path = self.temp_file_path();
        let written: std::io::Result<()> = async {
            fs::write(&temp_path, data).await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(BackendError::Io(e));
        }
        Ok(())
    }

    async fn lock(&self) -> Result<StateLock> {
        self.ensure_parent_dir().await?;

        // Blocks until every other holder has dropped its lock.
        let path = self.lock_file_path();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<LockFile> {
            let mut file = LockFile::open(path.as_path())?;
            file.lock()?;
            Ok(file)
        })
        .await
        .map_err(|e| BackendError::Other(format!("lock task failed: {}", e)))??;

        Ok(StateLock::file(file))
    }
}
