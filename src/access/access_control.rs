//! The single authorization check applied before every gated operation.
//!
//! | Operation    | Public repository   | Private repository  |
//! |--------------|---------------------|---------------------|
//! | `Read`       | anyone              | owner, collaborator |
//! | `Write`      | owner, collaborator | owner, collaborator |
//! | `Administer` | owner               | owner               |

use std::fmt;

use crate::repo::{RepoError, Result};
use crate::repository::{Principal, Repository};

/// The kind of access an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reads, and proposals (which only need to see the repository).
    Read,
    /// File, commit, branch and anchor mutations.
    Write,
    /// Deleting the repository, managing collaborators, approving proposals.
    Administer,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Administer => "administer",
        };
        f.write_str(name)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Decide whether `caller` may perform `operation` on `repository`.
pub fn authorize(caller: &Principal, repository: &Repository, operation: Operation) -> Access {
    let allowed = match operation {
        Operation::Read => !repository.is_private || repository.is_member(caller),
        Operation::Write => repository.is_member(caller),
        Operation::Administer => repository.is_owner(caller),
    };
    if allowed { Access::Allow } else { Access::Deny }
}

/// [`authorize`], turning a denial into [`RepoError::Unauthorized`].
pub fn require(caller: &Principal, repository: &Repository, operation: Operation) -> Result<()> {
    match authorize(caller, repository, operation) {
        Access::Allow => Ok(()),
        Access::Deny => {
            tracing::warn!(
                repo_id = %repository.id,
                caller = %caller,
                %operation,
                "access denied"
            );
            Err(RepoError::Unauthorized {
                caller: caller.clone(),
                operation,
                repository: repository.id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NewRepository;

    fn repo(is_private: bool) -> Repository {
        let mut repo = Repository::new(
            "r1".to_string(),
            Principal::new("owner"),
            NewRepository::new("demo").with_private(is_private),
            "main",
            1,
        );
        repo.collaborators.insert(Principal::new("collab"));
        repo
    }

    fn check(repo: &Repository, who: &str, operation: Operation) -> Access {
        authorize(&Principal::new(who), repo, operation)
    }

    #[test]
    fn test_public_repository() {
        let repo = repo(false);
        assert_eq!(check(&repo, "stranger", Operation::Read), Access::Allow);
        assert_eq!(check(&repo, "stranger", Operation::Write), Access::Deny);
        assert_eq!(check(&repo, "collab", Operation::Write), Access::Allow);
        assert_eq!(check(&repo, "owner", Operation::Write), Access::Allow);
        assert_eq!(check(&repo, "collab", Operation::Administer), Access::Deny);
        assert_eq!(check(&repo, "owner", Operation::Administer), Access::Allow);
    }

    #[test]
    fn test_private_repository() {
        let repo = repo(true);
        assert_eq!(check(&repo, "stranger", Operation::Read), Access::Deny);
        assert_eq!(check(&repo, "collab", Operation::Read), Access::Allow);
        assert_eq!(check(&repo, "owner", Operation::Read), Access::Allow);
        assert_eq!(check(&repo, "stranger", Operation::Write), Access::Deny);
    }

    #[test]
    fn test_require_reports_unauthorized() {
        let repo = repo(true);
        let err = require(&Principal::new("stranger"), &repo, Operation::Read).unwrap_err();
        assert_eq!(
            err,
            RepoError::Unauthorized {
                caller: Principal::new("stranger"),
                operation: Operation::Read,
                repository: "r1".to_string(),
            }
        );
        assert!(require(&Principal::new("owner"), &repo, Operation::Administer).is_ok());
    }
}
