//! Configuration for iam-preflight.
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/iam-preflight/config.toml)
//! - User configuration (~/.iam-preflight.toml)
//! - Project configuration (./iam-preflight.toml)
//! - Environment variables
//! - Command-line arguments (applied by the CLI layer)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AWS client settings
    pub aws: AwsSettings,

    /// Output settings
    pub output: OutputSettings,

    /// Checklist settings
    pub check: CheckSettings,
}

/// AWS client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Region override; the SDK default chain applies when unset
    pub region: Option<String>,

    /// Shared-config profile to use
    pub profile: Option<String>,
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Enable colored output (default: true; NO_COLOR still wins)
    pub color: Option<bool>,
}

/// Checklist settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Required actions appended to the compiled-in list
    pub additional_actions: Vec<String>,
}

impl Config {
    /// Load configuration by merging all standard locations, then applying
    /// environment variable overrides.
    ///
    /// An explicit path replaces the standard search entirely.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// The list of configuration file paths to check, lowest precedence
    /// first.
    fn config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("/etc/iam-preflight/config.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".iam-preflight.toml"));
        }

        paths.push(PathBuf::from("iam-preflight.toml"));
        paths
    }

    /// Merge settings from a TOML file over this configuration. Scalar
    /// options set in the file win; additional actions accumulate.
    fn merge_from_file(mut self, path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let file: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if file.aws.region.is_some() {
            self.aws.region = file.aws.region;
        }
        if file.aws.profile.is_some() {
            self.aws.profile = file.aws.profile;
        }
        if file.output.color.is_some() {
            self.output.color = file.output.color;
        }
        for action in file.check.additional_actions {
            if !self.check.additional_actions.contains(&action) {
                self.check.additional_actions.push(action);
            }
        }

        Ok(self)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(region) = std::env::var("IAM_PREFLIGHT_REGION") {
            if !region.is_empty() {
                self.aws.region = Some(region);
            }
        }
        if let Ok(profile) = std::env::var("IAM_PREFLIGHT_PROFILE") {
            if !profile.is_empty() {
                self.aws.profile = Some(profile);
            }
        }
        if std::env::var("IAM_PREFLIGHT_NO_COLOR").is_ok() {
            self.output.color = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.aws.region.is_none());
        assert!(config.check.additional_actions.is_empty());
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_merge_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[aws]
region = "eu-central-1"

[check]
additional_actions = ["kms:CreateKey"]
"#
        )
        .unwrap();

        let config = Config::default()
            .merge_from_file(&file.path().to_path_buf())
            .unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("eu-central-1"));
        assert!(config.aws.profile.is_none());
        assert_eq!(config.check.additional_actions, vec!["kms:CreateKey"]);
    }

    #[test]
    fn test_merge_accumulates_actions_without_duplicates() {
        let mut base = Config::default();
        base.check.additional_actions = vec!["kms:CreateKey".to_string()];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[check]
additional_actions = ["kms:CreateKey", "kms:CreateGrant"]
"#
        )
        .unwrap();

        let config = base.merge_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(
            config.check.additional_actions,
            vec!["kms:CreateKey", "kms:CreateGrant"]
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not [valid toml").unwrap();

        assert!(Config::default()
            .merge_from_file(&file.path().to_path_buf())
            .is_err());
    }

    #[test]
    fn test_explicit_path_replaces_search() {
        let explicit = PathBuf::from("/tmp/custom.toml");
        let paths = Config::config_paths(Some(&explicit));
        assert_eq!(paths, vec![explicit]);
    }
}
