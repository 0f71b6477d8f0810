//! Error types for repository operations.

use crate::access::Operation;
use crate::repository::{JsonError, Principal, RepositoryId};

/// Error type for repository operations.
///
/// Every variant is raised before any state is written, so a failed call
/// leaves the store exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    /// A repository, branch, commit, file or proposal reference did not resolve.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// The caller lacks owner/collaborator standing for the operation.
    #[error("{caller} is not allowed to {operation} repository {repository}")]
    Unauthorized {
        caller: Principal,
        operation: Operation,
        repository: RepositoryId,
    },

    /// Duplicate branch name or repository id.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An empty or malformed required field.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Canonical JSON encoding failed while deriving an id.
    #[error("JSON error: {0}")]
    Json(String),
}

impl RepoError {
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        RepoError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RepoError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<JsonError> for RepoError {
    fn from(e: JsonError) -> Self {
        RepoError::Json(e.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;

/// Reject empty or whitespace-only required fields.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RepoError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RepoError::not_found("branch", "dev").to_string(),
            "branch not found: dev"
        );
        assert_eq!(
            RepoError::Unauthorized {
                caller: Principal::new("mallory"),
                operation: Operation::Write,
                repository: "r1".to_string(),
            }
            .to_string(),
            "mallory is not allowed to write repository r1"
        );
        assert_eq!(
            RepoError::validation("name", "must not be empty").to_string(),
            "invalid name: must not be empty"
        );
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("message", "init").is_ok());
        assert!(matches!(
            require_non_empty("message", "   "),
            Err(RepoError::Validation { field: "message", .. })
        ));
    }
}
