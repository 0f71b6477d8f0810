//! Governance proposals, recorded independently of commits.

mod proposal_ledger;

pub use proposal_ledger::{ProposalLedger, ProposalVisibility};
