//! TOML configuration for `fmixc`.
//!
//! Every section is optional; command-line flags override whatever the file
//! provides. See [`load_config`] for validation rules.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::tools::OwnershipPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Directory for the file backend, or the Git backend's work directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            output: None,
            repo: default_repo(),
            branch: default_branch(),
        }
    }
}

fn default_kind() -> String {
    "file".to_string()
}
fn default_repo() -> String {
    "git@github.com:modelica/fmi-cross-check-data.git".to_string()
}
fn default_branch() -> String {
    "testing".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessingConfig {
    #[serde(default = "default_true")]
    pub imports: bool,
    #[serde(default)]
    pub pedantic: bool,
    /// Require import tools to be local and export tools to be known.
    #[serde(default)]
    pub strict_tools: bool,
    /// What `--moved` means: `transfer` or `suppress`.
    #[serde(default = "default_moved_policy")]
    pub moved_policy: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            imports: true,
            pedantic: false,
            strict_tools: false,
            moved_policy: default_moved_policy(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_moved_policy() -> String {
    "transfer".to_string()
}

impl ProcessingConfig {
    /// Ownership policy for a run, given whether `--moved` was passed.
    pub fn ownership_policy(&self, moved: bool) -> Result<OwnershipPolicy> {
        if !moved {
            return Ok(OwnershipPolicy::Reject);
        }
        match self.moved_policy.as_str() {
            "transfer" => Ok(OwnershipPolicy::Transfer),
            "suppress" => Ok(OwnershipPolicy::Suppress),
            other => anyhow::bail!(
                "Unknown processing.moved_policy: '{}'. Must be transfer or suppress.",
                other
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
    /// Findings log file; findings go to stderr when unset.
    #[serde(default)]
    pub logfile: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            logfile: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_format() -> String {
    "text".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
///
/// Only used for the default config location; an explicitly named file that
/// does not exist is an error.
pub fn load_or_default(path: &Path, explicit: bool) -> Result<Config> {
    if !explicit && !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    match config.database.kind.as_str() {
        "file" | "git" | "dryrun" => {}
        other => anyhow::bail!(
            "Unknown database kind: '{}'. Must be file, git, or dryrun.",
            other
        ),
    }

    if config.database.kind == "git" {
        if config.database.branch.trim().is_empty() {
            anyhow::bail!("database.branch must be set when kind is 'git'");
        }
        if config.database.repo.trim().is_empty() {
            anyhow::bail!("database.repo must be set when kind is 'git'");
        }
    }

    match config.logging.format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Unknown logging.format: '{}'. Must be text or json.", other),
    }

    config.processing.ownership_policy(true)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fmixc.toml");
        std::fs::write(&path, "").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.database.kind, "file");
        assert_eq!(config.database.branch, "testing");
        assert!(config.processing.imports);
        assert!(!config.processing.pedantic);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_sections_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fmixc.toml");
        std::fs::write(
            &path,
            r#"
[database]
kind = "git"
output = "work"
branch = "main"

[processing]
imports = false
strict_tools = true
moved_policy = "suppress"

[logging]
format = "json"
logfile = "findings.log"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.database.kind, "git");
        assert_eq!(config.database.output, Some(PathBuf::from("work")));
        assert!(!config.processing.imports);
        assert!(config.processing.strict_tools);
        assert_eq!(
            config.processing.ownership_policy(true).unwrap(),
            OwnershipPolicy::Suppress
        );
        assert_eq!(
            config.processing.ownership_policy(false).unwrap(),
            OwnershipPolicy::Reject
        );
        assert_eq!(config.logging.logfile, Some(PathBuf::from("findings.log")));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fmixc.toml");
        std::fs::write(&path, "[database]\nkind = \"mongo\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown database kind"));
    }

    #[test]
    fn test_rejects_unknown_moved_policy() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fmixc.toml");
        std::fs::write(&path, "[processing]\nmoved_policy = \"steal\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_default_path_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");
        assert!(load_or_default(&path, false).is_ok());
        assert!(load_or_default(&path, true).is_err());
    }
}
