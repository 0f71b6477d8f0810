//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{Config, LogConfig, ProposalsConfig, RepositoriesConfig, StateConfig};
use crate::proposals::ProposalVisibility;
use crate::store::DEFAULT_BRANCH_NAME;

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_STATE_DIR: &str = ".repohub";
const DEFAULT_STATE_FILENAME: &str = "state.json";
const DEFAULT_STATE_PERSIST: bool = true;
const DEFAULT_LOG_FILTER: &str = "warn";

const ENV_CONFIG_FILE: &str = "REPOHUB_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".repohubconfig";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid boolean '{value}' for key '{key}'")]
    InvalidBoolean { key: String, value: String },

    #[error("invalid value '{value}' for key '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to REPOHUB_CONFIG_FILE env var, then ~/.repohubconfig.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "state.path", "proposals.visibility"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Value Parsing
// =============================================================================

fn parse_bool_value(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_visibility(key: &str, value: &str) -> Result<ProposalVisibility> {
    value
        .parse()
        .map_err(|message| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message,
        })
}

fn parse_non_empty(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
pub struct ResolvedConfigFile {
    /// The path to the config file, if one was found.
    pub path: Option<PathBuf>,
    /// Warning message if env var pointed to nonexistent file.
    pub warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    // If explicit path provided, it must exist
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    // Check environment variable
    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    // Check ~/.repohubconfig
    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    // No config file found
    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
fn default_config() -> Config {
    let state_dir = match home_dir() {
        Some(home) => home.join(DEFAULT_STATE_DIR),
        None => PathBuf::from(DEFAULT_STATE_DIR),
    };

    Config {
        repositories: RepositoriesConfig {
            default_branch: DEFAULT_BRANCH_NAME.to_string(),
        },
        proposals: ProposalsConfig {
            visibility: ProposalVisibility::default(),
        },
        state: StateConfig {
            path: state_dir.join(DEFAULT_STATE_FILENAME),
            persist: DEFAULT_STATE_PERSIST,
        },
        log: LogConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
        },
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

/// Every recognized `section.key`; INI files and overrides share this table.
fn apply_value(config: &mut Config, section: &str, key: &str, value: &str) -> Result<()> {
    let full_key = format!("{}.{}", section, key);
    match (section, key) {
        ("repositories", "default_branch") => {
            config.repositories.default_branch = parse_non_empty(&full_key, value)?;
        }
        ("proposals", "visibility") => {
            config.proposals.visibility = parse_visibility(&full_key, value)?;
        }
        ("state", "path") => {
            config.state.path = expand_home(&parse_non_empty(&full_key, value)?);
        }
        ("state", "persist") => {
            config.state.persist = parse_bool_value(&full_key, value)?;
        }
        ("log", "filter") => {
            config.log.filter = parse_non_empty(&full_key, value)?;
        }
        _ => {
            return Err(ConfigError::InvalidOverrideKey {
                key: full_key,
                message: "unknown parameter".to_string(),
            });
        }
    }
    Ok(())
}

/// Apply an INI file's contents to a Config, layering on top of existing values.
///
/// Keys absent from the file keep their current values. Unknown sections are
/// ignored so one file can be shared with other tools.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    const KNOWN: &[(&str, &str)] = &[
        ("repositories", "default_branch"),
        ("proposals", "visibility"),
        ("state", "path"),
        ("state", "persist"),
        ("log", "filter"),
    ];

    for (section, key) in KNOWN {
        if let Some(value) = ini.get(section, key) {
            apply_value(config, section, key, &value)?;
        }
    }
    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key.split_once('.') {
        Some((section, param)) => apply_value(config, section, param, value),
        None => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.repohubconfig)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    // Start with defaults
    let mut config = default_config();

    // Resolve and apply base config file
    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    // Apply override config file if specified
    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    // Apply individual overrides
    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.repositories.default_branch, "main");
        assert_eq!(config.proposals.visibility, ProposalVisibility::Readable);
        assert!(config.state.persist);
        assert!(config.state.path.ends_with(".repohub/state.json"));
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_apply_override() {
        let mut config = default_config();
        apply_override(&mut config, "state.path", "/custom/state.json").unwrap();
        assert_eq!(config.state.path, PathBuf::from("/custom/state.json"));

        apply_override(&mut config, "state.persist", "no").unwrap();
        assert!(!config.state.persist);

        apply_override(&mut config, "proposals.visibility", "global").unwrap();
        assert_eq!(config.proposals.visibility, ProposalVisibility::Global);

        apply_override(&mut config, "repositories.default_branch", "trunk").unwrap();
        assert_eq!(config.repositories.default_branch, "trunk");
    }

    #[test]
    fn test_apply_override_errors() {
        let mut config = default_config();
        assert!(matches!(
            apply_override(&mut config, "state", "x"),
            Err(ConfigError::InvalidOverrideKey { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "state.color", "blue"),
            Err(ConfigError::InvalidOverrideKey { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "state.persist", "maybe"),
            Err(ConfigError::InvalidBoolean { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "proposals.visibility", "everyone"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "repositories.default_branch", " "),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_read_config_with_overrides_only() {
        let source = ConfigSource {
            config_file: None,
            override_file: None,
            overrides: vec![("log.filter".to_string(), "repohub=debug".to_string())],
        };
        let result = read_config(&source).unwrap();
        assert_eq!(result.config.log.filter, "repohub=debug");
    }

    #[test]
    fn test_read_config_missing_explicit_file() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/definitely/not/here.ini")),
            ..ConfigSource::default()
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_read_config_layers_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.ini");
        let layer = dir.path().join("layer.ini");
        std::fs::write(
            &base,
            "[repositories]\ndefault_branch = trunk\n\n[state]\npersist = false\n",
        )
        .unwrap();
        std::fs::write(&layer, "[repositories]\ndefault_branch = develop\n").unwrap();

        let source = ConfigSource {
            config_file: Some(base),
            override_file: Some(layer),
            overrides: vec![],
        };
        let config = read_config(&source).unwrap().config;
        assert_eq!(config.repositories.default_branch, "develop");
        assert!(!config.state.persist);
    }

    #[test]
    fn test_parse_ini_config() {
        let mut ini = Ini::new();
        ini.read(
            r#"
[proposals]
visibility = global

[state]
path = /var/lib/repohub/state.json

[log]
filter = info

[unrelated]
key = value
"#
            .to_string(),
        )
        .unwrap();

        let mut config = default_config();
        apply_ini_to_config(&mut config, &ini).unwrap();

        assert_eq!(config.proposals.visibility, ProposalVisibility::Global);
        assert_eq!(
            config.state.path,
            PathBuf::from("/var/lib/repohub/state.json")
        );
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.repositories.default_branch, "main");
    }
}
