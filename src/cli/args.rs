//! Command-line argument definitions and helpers.

use std::path::PathBuf;

use clap::Args;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::ConfigSource;
use crate::repository::Principal;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during argument processing.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// I/O error reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument combination.
    #[error("{0}")]
    InvalidArgs(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for argument operations.
pub type Result<T> = std::result::Result<T, ArgsError>;

// =============================================================================
// Global Arguments
// =============================================================================

/// Global arguments that apply to all commands.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the main configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Path to the configuration overrides file.
    #[arg(long = "config-file-overrides", global = true)]
    pub config_file_overrides: Option<PathBuf>,

    /// Configuration overrides in the form name=value.
    #[arg(long = "config", value_parser = parse_config_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Format output as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Identity the command runs as.
    #[arg(long, env = "REPOHUB_PRINCIPAL", global = true)]
    pub principal: Option<String>,
}

impl GlobalArgs {
    /// Convert to a ConfigSource for reading configuration.
    pub fn to_config_source(&self) -> ConfigSource {
        ConfigSource {
            config_file: self.config_file.clone(),
            override_file: self.config_file_overrides.clone(),
            overrides: self.config_overrides.clone(),
        }
    }

    /// The calling principal. Every command acts on behalf of one.
    pub fn caller(&self) -> Result<Principal> {
        match self.principal.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(Principal::new(name)),
            _ => Err(ArgsError::InvalidArgs(
                "no principal: pass --principal or set REPOHUB_PRINCIPAL".to_string(),
            )),
        }
    }
}

/// Parse a config override from "name=value" format.
fn parse_config_override(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid config override '{}': expected name=value", s))?;
    Ok((name.to_string(), value.to_string()))
}

// =============================================================================
// Input/Output Helpers
// =============================================================================

/// Helper for commands that read input from an argument, file, or stdin.
#[derive(Args, Debug, Default)]
pub struct InputSource {
    /// Read input from this file instead of an argument.
    #[arg(id = "input_file", short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

impl InputSource {
    /// Read the input as raw bytes.
    ///
    /// If `arg_value` is provided, returns its bytes (error if file is also set).
    /// If `file` is set, reads the whole file.
    /// Otherwise, reads stdin to the end.
    pub async fn read_bytes(&self, arg_value: Option<&str>) -> Result<Vec<u8>> {
        match (arg_value, &self.file) {
            (Some(_), Some(_)) => Err(ArgsError::InvalidArgs(
                "cannot specify both a value argument and --input-file".to_string(),
            )),
            (Some(value), None) => Ok(value.as_bytes().to_vec()),
            (None, Some(path)) => Ok(tokio::fs::read(path).await?),
            (None, None) => {
                let mut contents = Vec::new();
                tokio::io::stdin().read_to_end(&mut contents).await?;
                Ok(contents)
            }
        }
    }
}

/// Helper for commands that write output to a file or stdout.
#[derive(Args, Debug, Default)]
pub struct OutputSink {
    /// Write output to this file instead of stdout.
    #[arg(id = "output_file", short = 'o', long = "output-file")]
    pub file: Option<PathBuf>,
}

impl OutputSink {
    /// Write a string value to the output.
    pub async fn write_str(&self, value: &str) -> Result<()> {
        match &self.file {
            Some(path) => {
                tokio::fs::write(path, value).await?;
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(value.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }

    /// Write a value to the output as pretty JSON.
    pub async fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.write_str(&output).await
    }

    /// Write one line per item.
    pub async fn write_lines<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        if joined.is_empty() && self.file.is_none() {
            return Ok(());
        }
        self.write_str(&joined).await
    }

    /// Write raw bytes to the output.
    pub async fn write_bytes(&self, data: &[u8]) -> Result<()> {
        match &self.file {
            Some(path) => {
                tokio::fs::write(path, data).await?;
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(data).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_override() {
        assert_eq!(
            parse_config_override("state.persist=false").unwrap(),
            ("state.persist".to_string(), "false".to_string())
        );
        assert_eq!(
            parse_config_override("log.filter=repohub=debug").unwrap(),
            ("log.filter".to_string(), "repohub=debug".to_string())
        );
        assert!(parse_config_override("no-equals").is_err());
    }

    #[test]
    fn test_caller_requires_principal() {
        let mut global = GlobalArgs::default();
        assert!(matches!(global.caller(), Err(ArgsError::InvalidArgs(_))));

        global.principal = Some("   ".to_string());
        assert!(global.caller().is_err());

        global.principal = Some("alice".to_string());
        assert_eq!(global.caller().unwrap(), Principal::new("alice"));
    }

    #[tokio::test]
    async fn test_input_source_reads_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        tokio::fs::write(&path, [0u8, 159, 146, 150]).await.unwrap();

        let input = InputSource { file: Some(path) };
        assert_eq!(
            input.read_bytes(None).await.unwrap(),
            vec![0u8, 159, 146, 150]
        );
        assert!(input.read_bytes(Some("inline")).await.is_err());

        let inline = InputSource::default();
        assert_eq!(inline.read_bytes(Some("hi")).await.unwrap(), b"hi");
    }

    #[tokio::test]
    async fn test_output_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let sink = OutputSink {
            file: Some(path.clone()),
        };
        sink.write_lines(["a", "b"]).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "a\nb");
    }
}
