//! Append-only ledger of governance proposals.
//!
//! Proposals reference repositories by id without owning them. The ledger
//! itself never checks that a repository exists; the store does that on every
//! call because a repository can be deleted after a proposal was filed.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::repo::{require_non_empty, RepoError, Result};
use crate::repository::{Principal, Proposal, ProposalId, RepositoryId, Timestamp};

/// Which proposals `list_proposals` shows a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProposalVisibility {
    /// Only proposals for existing repositories the caller may read.
    #[default]
    Readable,
    /// Every proposal in the ledger.
    Global,
}

impl FromStr for ProposalVisibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "readable" => Ok(ProposalVisibility::Readable),
            "global" => Ok(ProposalVisibility::Global),
            other => Err(format!(
                "unknown proposal visibility '{}': expected readable or global",
                other
            )),
        }
    }
}

/// The proposal records plus the id counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalLedger {
    proposals: Vec<Proposal>,
    next_id: ProposalId,
}

impl Default for ProposalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalLedger {
    pub fn new() -> Self {
        Self {
            proposals: vec![],
            next_id: 1,
        }
    }

    /// File a new, unapproved proposal and return its id.
    pub fn create(
        &mut self,
        repository_id: &RepositoryId,
        proposer: &Principal,
        message: &str,
        now: Timestamp,
    ) -> Result<ProposalId> {
        require_non_empty("message", message)?;

        let id = self.next_id;
        self.next_id += 1;
        self.proposals.push(Proposal {
            id,
            repository_id: repository_id.clone(),
            proposer: proposer.clone(),
            message: message.to_string(),
            timestamp: now,
            approved: false,
        });
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    /// Mark a proposal approved. Approving twice is a no-op.
    pub fn approve(&mut self, id: ProposalId) -> Result<&Proposal> {
        let proposal = self
            .proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepoError::not_found("proposal", id))?;
        proposal.approved = true;
        Ok(proposal)
    }

    /// All proposals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut ledger = ProposalLedger::new();
        let alice = Principal::new("alice");
        let a = ledger
            .create(&"r1".to_string(), &alice, "first", 1)
            .unwrap();
        let b = ledger
            .create(&"r2".to_string(), &alice, "second", 1)
            .unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        let p = ledger.get(b).unwrap();
        assert_eq!(p.repository_id, "r2");
        assert_eq!(p.proposer, alice);
        assert!(!p.approved);
    }

    #[test]
    fn test_failed_create_does_not_consume_id() {
        let mut ledger = ProposalLedger::new();
        let alice = Principal::new("alice");
        assert!(ledger.create(&"r1".to_string(), &alice, "", 1).is_err());
        assert_eq!(
            ledger.create(&"r1".to_string(), &alice, "ok", 1).unwrap(),
            1
        );
    }

    #[test]
    fn test_approve() {
        let mut ledger = ProposalLedger::new();
        let id = ledger
            .create(&"r1".to_string(), &Principal::new("bob"), "change", 1)
            .unwrap();

        assert!(ledger.approve(id).unwrap().approved);
        assert!(ledger.approve(id).unwrap().approved);
        assert!(matches!(
            ledger.approve(99),
            Err(RepoError::NotFound { kind: "proposal", .. })
        ));
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!(
            "Global".parse::<ProposalVisibility>().unwrap(),
            ProposalVisibility::Global
        );
        assert_eq!(
            "readable".parse::<ProposalVisibility>().unwrap(),
            ProposalVisibility::Readable
        );
        assert!("everyone".parse::<ProposalVisibility>().is_err());
    }
}
