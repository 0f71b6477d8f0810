//! Repository id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::repository::RepositoryId;

/// A source of fresh repository ids.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> RepositoryId;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> RepositoryId {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable ids of the form `{prefix}-{n}`, starting at 1.
#[derive(Debug)]
pub struct SequentialIdSource {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> RepositoryId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}
