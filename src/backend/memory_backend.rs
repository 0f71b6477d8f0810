use std::sync::RwLock;

use async_trait::async_trait;

use super::state_backend::{BackendError, Result, StateBackend};

/// An in-memory implementation of `StateBackend`, intended primarily for testing.
#[derive(Default)]
pub struct MemoryBackend {
    snapshot: RwLock<Option<Vec<u8>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Other("memory backend lock poisoned".to_string())
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let snapshot = self.snapshot.read().map_err(poisoned)?;
        Ok(snapshot.clone())
    }

    async fn save(&self, data: &[u8]) -> Result<()> {
        let mut snapshot = self.snapshot.write().map_err(poisoned)?;
        *snapshot = Some(data.to_vec());
        Ok(())
    }
}
