//! Configuration types for repohub.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::path::PathBuf;

use crate::proposals::ProposalVisibility;

// =============================================================================
// Config Sections
// =============================================================================

/// [repositories] section - defaults applied to newly created repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoriesConfig {
    pub default_branch: String,
}

/// [proposals] section - governance ledger policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalsConfig {
    pub visibility: ProposalVisibility,
}

/// [state] section - where the store snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    pub path: PathBuf,
    /// When false, state is kept in memory and lost at exit.
    pub persist: bool,
}

/// [log] section - tracing filter directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repositories: RepositoriesConfig,
    pub proposals: ProposalsConfig,
    pub state: StateConfig,
    pub log: LogConfig,
}
