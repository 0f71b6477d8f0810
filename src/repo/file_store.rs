//! The working set of a repository: path to current file entry.
//!
//! The working set is repository-global. Switching branches does not touch it.

use crate::repository::{hash_content, FileEntry, Repository, Timestamp};

use super::error::{require_non_empty, RepoError, Result};

impl Repository {
    /// Insert or replace the file at `path`.
    ///
    /// The digest is recomputed from `content` on every write, so an entry's
    /// hash is never stale. No size limit is applied here.
    pub fn upload_file(
        &mut self,
        path: &str,
        content: Vec<u8>,
        now: Timestamp,
    ) -> Result<&FileEntry> {
        require_non_empty("path", path)?;

        let entry = FileEntry {
            path: path.to_string(),
            hash: hash_content(&content),
            content,
            last_modified: now,
        };
        self.files.insert(path.to_string(), entry);
        self.touch(now);

        tracing::debug!(repo_id = %self.id, path, "file uploaded");
        Ok(&self.files[path])
    }

    /// Current entry at `path`, if any.
    pub fn get_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    /// Remove the entry at `path`, returning it.
    ///
    /// Unknown paths are reported as `NotFound` rather than ignored.
    pub fn delete_file(&mut self, path: &str, now: Timestamp) -> Result<FileEntry> {
        let removed = self
            .files
            .remove(path)
            .ok_or_else(|| RepoError::not_found("file", path))?;
        self.touch(now);

        tracing::debug!(repo_id = %self.id, path, "file deleted");
        Ok(removed)
    }

    /// Paths of the working set in lexicographic order.
    pub fn list_files(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Deep copy of the working set, ordered by path.
    pub(crate) fn snapshot_files(&self) -> Vec<FileEntry> {
        self.files.values().cloned().collect()
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
    fn test_upload_then_get_roundtrip() {
        let mut repo = repo();
        repo.upload_file("README.md", b"hello".to_vec(), 5).unwrap();

        let entry = repo.get_file("README.md").unwrap();
        assert_eq!(entry.content, b"hello");
        assert_eq!(entry.hash, hash_content(b"hello"));
        assert_eq!(entry.last_modified, 5);
        assert_eq!(repo.updated_at, 5);
    }

    #[test]
    fn test_upload_replaces_and_rehashes() {
        let mut repo = repo();
        repo.upload_file("a.txt", b"one".to_vec(), 2).unwrap();
        repo.upload_file("a.txt", b"two".to_vec(), 3).unwrap();

        let entry = repo.get_file("a.txt").unwrap();
        assert_eq!(entry.content, b"two");
        assert_eq!(entry.hash, hash_content(b"two"));
        assert_eq!(entry.last_modified, 3);
        assert_eq!(repo.list_files(), vec!["a.txt"]);
    }

    #[test]
    fn test_upload_rejects_empty_path() {
        let mut repo = repo();
        let result = repo.upload_file("", b"x".to_vec(), 2);
        assert!(matches!(result, Err(RepoError::Validation { field: "path", .. })));
        assert!(repo.files.is_empty());
        assert_eq!(repo.updated_at, 1);
    }

    #[test]
    fn test_get_unknown_path_is_absent() {
        assert!(repo().get_file("missing").is_none());
    }

    #[test]
    fn test_delete_file() {
        let mut repo = repo();
        repo.upload_file("a.txt", b"a".to_vec(), 2).unwrap();

        let removed = repo.delete_file("a.txt", 4).unwrap();
        assert_eq!(removed.content, b"a");
        assert!(repo.get_file("a.txt").is_none());
        assert_eq!(repo.updated_at, 4);

        let result = repo.delete_file("a.txt", 5);
        assert!(matches!(result, Err(RepoError::NotFound { kind: "file", .. })));
        assert_eq!(repo.updated_at, 4);
    }

    #[test]
    fn test_list_files_is_sorted() {
        let mut repo = repo();
        repo.upload_file("src/main.rs", vec![], 2).unwrap();
        repo.upload_file("Cargo.toml", vec![], 3).unwrap();
        repo.upload_file("README.md", vec![], 4).unwrap();

        assert_eq!(
            repo.list_files(),
            vec!["Cargo.toml", "README.md", "src/main.rs"]
        );
        assert_eq!(repo.list_files(), repo.list_files());
    }
}
