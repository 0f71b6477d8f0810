//! External-ledger references attached to commits.
//!
//! These are annotations only: the referenced transactions are never looked
//! up or verified.

use crate::repository::{ChainMetadata, CommitMetadata, Repository, Timestamp};

use super::error::{RepoError, Result};

impl Repository {
    /// Record chain references for an existing commit.
    ///
    /// Records are appended; a commit may be anchored more than once.
    pub fn anchor_commit(
        &mut self,
        commit_id: &str,
        chain: ChainMetadata,
        now: Timestamp,
    ) -> Result<()> {
        if self.get_commit(commit_id).is_none() {
            return Err(RepoError::not_found("commit", commit_id));
        }
        if chain.is_empty() {
            return Err(RepoError::validation(
                "chain metadata",
                "at least one transaction reference is required",
            ));
        }

        self.chain_metadata.push(CommitMetadata {
            commit_id: commit_id.to_string(),
            chain,
        });
        self.touch(now);

        tracing::info!(repo_id = %self.id, commit = commit_id, "commit anchored");
        Ok(())
    }

    /// Anchors recorded for one commit, oldest first.
    pub fn chain_metadata_for(&self, commit_id: &str) -> Vec<&CommitMetadata> {
        self.chain_metadata
            .iter()
            .filter(|m| m.commit_id == commit_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{NewRepository, Principal};

    fn repo_with_commit() -> (Repository, String) {
        let mut repo = Repository::new(
            "r1".to_string(),
            Principal::new("alice"),
            NewRepository::new("demo"),
            "main",
            1,
        );
        let id = repo.commit_changes("init", 2).unwrap().id.clone();
        (repo, id)
    }

    fn eth(tx: &str) -> ChainMetadata {
        ChainMetadata {
            eth_tx: Some(tx.to_string()),
            btc_tx: None,
        }
    }

    #[test]
    fn test_anchor_commit() {
        let (mut repo, id) = repo_with_commit();
        repo.anchor_commit(&id, eth("0xabc"), 3).unwrap();
        repo.anchor_commit(&id, eth("0xdef"), 4).unwrap();

        let anchors = repo.chain_metadata_for(&id);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].chain.eth_tx.as_deref(), Some("0xabc"));
        assert_eq!(anchors[1].chain.eth_tx.as_deref(), Some("0xdef"));
        assert_eq!(repo.updated_at, 4);
    }

    #[test]
    fn test_anchor_unknown_commit() {
        let (mut repo, _) = repo_with_commit();
        let result = repo.anchor_commit("missing", eth("0xabc"), 3);
        assert!(matches!(result, Err(RepoError::NotFound { kind: "commit", .. })));
        assert!(repo.chain_metadata.is_empty());
    }

    #[test]
    fn test_anchor_requires_a_reference() {
        let (mut repo, id) = repo_with_commit();
        let result = repo.anchor_commit(&id, ChainMetadata::default(), 3);
        assert!(matches!(result, Err(RepoError::Validation { .. })));
        assert!(repo.chain_metadata.is_empty());
    }
}
