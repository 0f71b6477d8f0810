//! Commit creation and history lookups.
//!
//! A commit is a deep copy of the working set at call time. Once recorded it
//! is never mutated or removed, so reads through a commit always return what
//! the files looked like when it was made.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::repository::{to_canonical_json, Commit, CommitId, FileEntry, Repository, Timestamp};

use super::error::{require_non_empty, RepoError, Result};

impl Repository {
    /// Snapshot the working set onto the current branch.
    ///
    /// The new commit is appended both to the current branch and to the flat
    /// history. An empty working set is a valid snapshot.
    pub fn commit_changes(&mut self, message: &str, now: Timestamp) -> Result<&Commit> {
        require_non_empty("message", message)?;
        if self.branch(&self.current_branch).is_none() {
            return Err(RepoError::not_found("branch", &self.current_branch));
        }

        let files = self.snapshot_files();
        let id = compute_commit_id(&self.id, self.commits.len() as u64, message, now, &files)?;
        if self.get_commit(&id).is_some() {
            return Err(RepoError::Conflict(format!("commit '{}' already exists", id)));
        }

        self.append_to_current_branch(&id)?;
        self.commits.push(Commit {
            id: id.clone(),
            message: message.to_string(),
            timestamp: now,
            files,
        });
        self.touch(now);

        tracing::info!(
            repo_id = %self.id,
            branch = %self.current_branch,
            commit = %id,
            "changes committed"
        );
        Ok(&self.commits[self.commits.len() - 1])
    }

    /// Any commit in the repository's history, regardless of branch.
    pub fn get_commit(&self, id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == id)
    }

    /// Full history in creation order.
    pub fn list_commits(&self) -> &[Commit] {
        &self.commits
    }

    /// A file as recorded in the given commit's snapshot.
    ///
    /// Never consults the live working set.
    pub fn get_commit_file_content(&self, commit_id: &str, path: &str) -> Option<&FileEntry> {
        self.get_commit(commit_id)?.file(path)
    }
}

/// The fields a commit id is derived from.
#[derive(Serialize)]
struct CommitSeed<'a> {
    repository: &'a str,
    sequence: u64,
    message: &'a str,
    timestamp: Timestamp,
    files: Vec<(&'a str, &'a str)>,
}

/// Derive a commit id from content and time.
///
/// The per-repository sequence number keeps ids unique even when message,
/// content and timestamp all repeat.
fn compute_commit_id(
    repository: &str,
    sequence: u64,
    message: &str,
    timestamp: Timestamp,
    files: &[FileEntry],
) -> Result<CommitId> {
    let seed = CommitSeed {
        repository,
        sequence,
        message,
        timestamp,
        files: files
            .iter()
            .map(|f| (f.path.as_str(), f.hash.as_str()))
            .collect(),
    };
    let json = to_canonical_json(&seed)?;

    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{hash_content, NewRepository, Principal};

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
    fn test_commit_snapshots_working_set() {
        let mut repo = repo();
        repo.upload_file("README.md", b"hello".to_vec(), 2).unwrap();

        let commit = repo.commit_changes("init", 3).unwrap().clone();
        assert_eq!(commit.message, "init");
        assert_eq!(commit.timestamp, 3);
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].path, "README.md");
        assert_eq!(commit.files[0].content, b"hello");
        assert_eq!(commit.id.len(), 64);

        assert_eq!(repo.list_commits().len(), 1);
        assert_eq!(repo.branch("main").unwrap().head(), Some(&commit.id));
        assert_eq!(repo.updated_at, 3);
    }

    #[test]
    fn test_commit_rejects_empty_message() {
        let mut repo = repo();
        let result = repo.commit_changes("", 2);
        assert!(matches!(result, Err(RepoError::Validation { field: "message", .. })));
        assert!(repo.commits.is_empty());
        assert!(repo.branch("main").unwrap().commits.is_empty());
    }

    #[test]
    fn test_empty_commit_is_allowed() {
        let mut repo = repo();
        let commit = repo.commit_changes("empty", 2).unwrap();
        assert!(commit.files.is_empty());
    }

    #[test]
    fn test_identical_commits_get_distinct_ids() {
        let mut repo = repo();
        let a = repo.commit_changes("same", 2).unwrap().id.clone();
        let b = repo.commit_changes("same", 2).unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn test_snapshot_survives_later_mutations() {
        let mut repo = repo();
        repo.upload_file("a.txt", b"v1".to_vec(), 2).unwrap();
        let id = repo.commit_changes("m1", 3).unwrap().id.clone();

        repo.upload_file("a.txt", b"v2".to_vec(), 4).unwrap();
        repo.upload_file("b.txt", b"new".to_vec(), 5).unwrap();
        repo.delete_file("a.txt", 6).unwrap();

        let recorded = repo.get_commit_file_content(&id, "a.txt").unwrap();
        assert_eq!(recorded.content, b"v1");
        assert_eq!(recorded.hash, hash_content(b"v1"));
        assert!(repo.get_commit_file_content(&id, "b.txt").is_none());
        assert!(repo.get_commit_file_content("nope", "a.txt").is_none());
    }

    #[test]
    fn test_commits_append_to_current_branch_only() {
        let mut repo = repo();
        let base = repo.commit_changes("base", 2).unwrap().id.clone();
        repo.create_branch("b2", "main", 3).unwrap();
        repo.switch_branch("b2", 4).unwrap();
        let on_b2 = repo.commit_changes("on b2", 5).unwrap().id.clone();

        assert_eq!(repo.branch("main").unwrap().commits, vec![base.clone()]);
        assert_eq!(
            repo.branch("b2").unwrap().commits,
            vec![base.clone(), on_b2]
        );

        repo.switch_branch("main", 6).unwrap();
        let on_main = repo.commit_changes("on main", 7).unwrap().id.clone();
        assert_eq!(
            repo.branch("main").unwrap().commits,
            vec![base.clone(), on_main]
        );
        assert_eq!(repo.branch("b2").unwrap().commits.len(), 2);
        assert_eq!(repo.list_commits().len(), 3);
    }
}
