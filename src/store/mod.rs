//! The repository registry and the core-facing operation surface.

mod repository_store;

pub use repository_store::{RepositoryStore, StoreSettings, StoreState, DEFAULT_BRANCH_NAME};
