//! CLI configuration file (`.ecsctl.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".ecsctl.toml";

/// Errors reading the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Defaults applied under the command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Cluster name used when `--cluster` is not given.
    pub cluster: Option<String>,
    pub region: Option<String>,
    /// Variable files or directories loaded before any `--env-file`.
    pub env_files: Vec<PathBuf>,
    /// Include directories searched after the manifest's directory.
    pub template_search_paths: Vec<PathBuf>,
    /// Report every invalid document instead of stopping at the first.
    pub keep_going: bool,
    /// Scan manifest directories recursively.
    pub recursive: bool,
}

impl CliConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `.ecsctl.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => {
                let default = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        debug!("Reading config from {:?}", path);
        Self::from_toml(&fs::read_to_string(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = CliConfig::from_toml(
            r#"
cluster = "staging"
region = "eu-west-1"
env_files = ["envs/common.env", "envs/staging"]
template_search_paths = ["partials"]
keep_going = true
"#,
        )
        .unwrap();

        assert_eq!(config.cluster.as_deref(), Some("staging"));
        assert_eq!(config.env_files.len(), 2);
        assert!(config.keep_going);
        assert!(!config.recursive);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            CliConfig::from_toml("clustr = \"typo\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(matches!(
            CliConfig::load(Some(&missing)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_explicit_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ecsctl.toml");
        fs::write(&path, "cluster = \"prod\"\nrecursive = true\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.cluster.as_deref(), Some("prod"));
        assert!(config.recursive);
    }
}
