//! Audit configuration: JSON file with environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

/// What the collector does when a single commitment, instance or region fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole audit on the first error.
    #[default]
    Abort,
    /// Log the error, record it in the report and keep going.
    Skip,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(Error::Config(format!("unknown error policy: {}", other))),
        }
    }
}

/// How the report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("unknown output format: {}", other))),
        }
    }
}

/// Top-level audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Projects to audit, in report order.
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Bearer token for the compute API. Never written back to disk.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default = "default_max_concurrent_projects")]
    pub max_concurrent_projects: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}
fn default_max_concurrent_projects() -> usize {
    4
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            access_token: None,
            error_policy: ErrorPolicy::Abort,
            output: OutputFormat::Text,
            max_concurrent_projects: 4,
            request_timeout_secs: 30,
            config_path: None,
        }
    }
}

impl AuditConfig {
    /// Load config from an optional JSON file, then apply environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a config file. A missing file is an error; unknown fields are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: AuditConfig = serde_json::from_str(&data)?;
        config.config_path = Some(path.to_path_buf());
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(projects) = lookup("COMMITAUDIT_PROJECTS") {
            self.projects = projects
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(url) = lookup("COMMITAUDIT_API_URL") {
            self.api_base_url = url;
        }
        if self.access_token.is_none() {
            self.access_token = lookup("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|t| !t.is_empty());
        }
        if let Some(policy) = lookup("COMMITAUDIT_ERROR_POLICY") {
            self.error_policy = policy.parse()?;
        }
        if let Some(output) = lookup("COMMITAUDIT_OUTPUT") {
            self.output = output.parse()?;
        }
        Ok(())
    }

    /// Check the config is usable. Live audits additionally need a token.
    pub fn validate(&self, live: bool) -> Result<()> {
        if self.projects.is_empty() {
            return Err(Error::Config("no projects configured".into()));
        }
        if self.max_concurrent_projects == 0 {
            return Err(Error::Config(
                "max_concurrent_projects must be at least 1".into(),
            ));
        }
        if live && self.access_token.is_none() {
            return Err(Error::Config(
                "no access token (set GOOGLE_OAUTH_ACCESS_TOKEN)".into(),
            ));
        }
        if !self.api_base_url.starts_with("https://") {
            warn!("API base URL is not https: {}", self.api_base_url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let config = AuditConfig::from_file(&path).unwrap();
        assert!(config.projects.is_empty());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.max_concurrent_projects, 4);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"projects": ["prod", "staging"], "error_policy": "skip", "output": "json"}"#,
        )
        .unwrap();

        let config = AuditConfig::from_file(&path).unwrap();
        assert_eq!(config.projects, vec!["prod", "staging"]);
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AuditConfig::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AuditConfig::default();
        config
            .apply_env(env(&[
                ("COMMITAUDIT_PROJECTS", "a, b,,c"),
                ("GOOGLE_OAUTH_ACCESS_TOKEN", "tok"),
                ("COMMITAUDIT_ERROR_POLICY", "Skip"),
            ]))
            .unwrap();

        assert_eq!(config.projects, vec!["a", "b", "c"]);
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
    }

    #[test]
    fn test_env_rejects_bad_policy() {
        let mut config = AuditConfig::default();
        let err = config
            .apply_env(env(&[("COMMITAUDIT_ERROR_POLICY", "retry")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_token_not_serialized() {
        let config = AuditConfig {
            access_token: Some("secret".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_validate() {
        let mut config = AuditConfig::default();
        assert!(config.validate(false).is_err());

        config.projects = vec!["prod".into()];
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());

        config.access_token = Some("tok".into());
        assert!(config.validate(true).is_ok());

        config.max_concurrent_projects = 0;
        assert!(config.validate(true).is_err());
    }
}
