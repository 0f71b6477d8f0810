//! Named branches and their commit histories.

use crate::repository::{Branch, Commit, Repository, Timestamp};

use super::error::{require_non_empty, RepoError, Result};

impl Repository {
    /// Look up a branch by name.
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    fn branch_mut(&mut self, name: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.name == name)
    }

    /// Fork `new_name` off `from`.
    ///
    /// The new branch starts with a copy of the source branch's history;
    /// afterwards the two evolve independently.
    pub fn create_branch(&mut self, new_name: &str, from: &str, now: Timestamp) -> Result<()> {
        require_non_empty("branch name", new_name)?;
        if self.branch(new_name).is_some() {
            return Err(RepoError::Conflict(format!(
                "branch '{}' already exists",
                new_name
            )));
        }
        let source = self
            .branch(from)
            .ok_or_else(|| RepoError::not_found("branch", from))?;

        let forked = Branch {
            name: new_name.to_string(),
            commits: source.commits.clone(),
        };
        self.branches.push(forked);
        self.touch(now);

        tracing::debug!(repo_id = %self.id, branch = new_name, from, "branch created");
        Ok(())
    }

    /// Make `name` the branch future commits append to.
    ///
    /// The working set is left as it is.
    pub fn switch_branch(&mut self, name: &str, now: Timestamp) -> Result<()> {
        if self.branch(name).is_none() {
            return Err(RepoError::not_found("branch", name));
        }
        self.current_branch = name.to_string();
        self.touch(now);

        tracing::debug!(repo_id = %self.id, branch = name, "switched branch");
        Ok(())
    }

    /// Branch names in creation order.
    pub fn list_branches(&self) -> Vec<String> {
        self.branches.iter().map(|b| b.name.clone()).collect()
    }

    pub fn get_current_branch(&self) -> Option<&str> {
        self.branch(&self.current_branch).map(|b| b.name.as_str())
    }

    /// Commits reachable from `name`, oldest first.
    pub fn branch_commits(&self, name: &str) -> Result<Vec<&Commit>> {
        let branch = self
            .branch(name)
            .ok_or_else(|| RepoError::not_found("branch", name))?;
        branch
            .commits
            .iter()
            .map(|id| {
                self.get_commit(id).ok_or_else(|| RepoError::not_found("commit", id))
            })
            .collect()
    }

    /// Append an already-recorded commit to the current branch.
    pub(crate) fn append_to_current_branch(&mut self, commit_id: &str) -> Result<()> {
        let current = self.current_branch.clone();
        let branch = self
            .branch_mut(&current)
            .ok_or_else(|| RepoError::not_found("branch", &current))?;
        branch.commits.push(commit_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{NewRepository, Principal};

    fn repo() -> Repository {
        Repository::new(
            "r1".to_string(),
            Principal::new("alice"),
            NewRepository::new("demo"),
            "main",
            1,
        )
    }

    #[test]
    fn test_create_and_list_branches() {
        let mut repo = repo();
        repo.create_branch("feature", "main", 2).unwrap();
        assert_eq!(repo.list_branches(), vec!["main", "feature"]);
        assert_eq!(repo.get_current_branch(), Some("main"));
        assert_eq!(repo.updated_at, 2);
    }

    #[test]
    fn test_create_branch_conflict() {
        let mut repo = repo();
        let result = repo.create_branch("main", "main", 2);
        assert!(matches!(result, Err(RepoError::Conflict(_))));
        assert_eq!(repo.branches.len(), 1);
    }

    #[test]
    fn test_create_branch_unknown_source() {
        let mut repo = repo();
        let result = repo.create_branch("feature", "nope", 2);
        assert!(matches!(result, Err(RepoError::NotFound { kind: "branch", .. })));
        assert_eq!(repo.list_branches(), vec!["main"]);
    }

    #[test]
    fn test_create_branch_rejects_empty_name() {
        let mut repo = repo();
        let result = repo.create_branch(" ", "main", 2);
        assert!(matches!(result, Err(RepoError::Validation { .. })));
    }

    #[test]
    fn test_switch_branch() {
        let mut repo = repo();
        repo.upload_file("a.txt", b"a".to_vec(), 2).unwrap();
        repo.create_branch("dev", "main", 3).unwrap();

        repo.switch_branch("dev", 4).unwrap();
        assert_eq!(repo.get_current_branch(), Some("dev"));
        // The working set is shared across branches.
        assert_eq!(repo.list_files(), vec!["a.txt"]);

        let result = repo.switch_branch("ghost", 5);
        assert!(matches!(result, Err(RepoError::NotFound { .. })));
        assert_eq!(repo.current_branch, "dev");
    }

    #[test]
    fn test_fork_starts_with_source_history() {
        let mut repo = repo();
        repo.upload_file("a.txt", b"a".to_vec(), 2).unwrap();
        let first = repo.commit_changes("init", 3).unwrap().id.clone();
        repo.create_branch("feature", "main", 4).unwrap();

        let feature: Vec<_> = repo
            .branch_commits("feature")
            .unwrap()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(feature, vec![first]);
    }

    #[test]
    fn test_branch_commits_unknown_branch() {
        assert!(matches!(
            repo().branch_commits("nope"),
            Err(RepoError::NotFound { kind: "branch", .. })
        ));
    }
}
