#![deny(missing_docs)]

//! # Framework Configuration
//!
//! Directory conventions, the API root, and the analysis knobs used when
//! reconciling contracts against handler sources. Every field has a default so
//! a partial YAML file (or none at all) is enough.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level framework configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Root directory holding `<feature>/<endpoint>/` trees.
    pub features_dir: PathBuf,
    /// Path segment prefixed to every contract path (e.g. `api`).
    pub api_root: String,
    /// Module path under which platform capabilities live.
    pub platform_namespace: String,
    /// Accepted contract file extensions, tried in order.
    pub contract_extensions: Vec<String>,
    /// Extension of handler source files.
    pub handler_extension: String,
    /// Method names treated as event emission.
    pub emit_methods: Vec<String>,
    /// Method names treated as event subscription.
    pub listen_methods: Vec<String>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            features_dir: PathBuf::from("features"),
            api_root: "api".to_string(),
            platform_namespace: "trellis_core::platform".to_string(),
            contract_extensions: vec!["yaml".into(), "yml".into(), "json".into()],
            handler_extension: "rs".to_string(),
            emit_methods: vec!["emit".into(), "publish".into()],
            listen_methods: vec!["on".into(), "subscribe".into(), "listen".into()],
        }
    }
}

impl FrameworkConfig {
    /// Loads a configuration from a YAML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;
        let config: FrameworkConfig = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Invalid config {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> AppResult<()> {
        if self.platform_namespace.trim().is_empty() {
            return Err(AppError::Config("platform_namespace must not be empty".into()));
        }
        if self.contract_extensions.is_empty() {
            return Err(AppError::Config(
                "at least one contract extension is required".into(),
            ));
        }
        if self.api_root.chars().any(char::is_whitespace) {
            return Err(AppError::Config(format!(
                "api_root must not contain whitespace: {:?}",
                self.api_root
            )));
        }
        Ok(())
    }

    /// The platform namespace split into path segments.
    pub fn namespace_segments(&self) -> Vec<String> {
        self.platform_namespace
            .split("::")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Candidate contract file names for an endpoint, in lookup order.
    pub fn contract_file_names(&self, endpoint: &str) -> Vec<String> {
        self.contract_extensions
            .iter()
            .map(|ext| format!("{}.contract.{}", endpoint, ext))
            .collect()
    }

    /// Handler source file name for an endpoint.
    pub fn handler_file_name(&self, endpoint: &str) -> String {
        format!("{}.logic.{}", endpoint, self.handler_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = FrameworkConfig::default();
        assert_eq!(config.api_root, "api");
        assert_eq!(config.namespace_segments(), vec!["trellis_core", "platform"]);
        assert_eq!(
            config.contract_file_names("hello"),
            vec![
                "hello.contract.yaml",
                "hello.contract.yml",
                "hello.contract.json"
            ]
        );
        assert_eq!(config.handler_file_name("hello"), "hello.logic.rs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trellis.yaml");
        fs::write(&path, "api_root: v1\nplatform_namespace: crate::platform\n").unwrap();

        let config = FrameworkConfig::from_file(&path).unwrap();
        assert_eq!(config.api_root, "v1");
        assert_eq!(config.namespace_segments(), vec!["crate", "platform"]);
        assert_eq!(config.features_dir, PathBuf::from("features"));
        assert_eq!(config.emit_methods, vec!["emit", "publish"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trellis.yaml");
        fs::write(&path, "contract_extensions: []\n").unwrap();

        let err = FrameworkConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_whitespace_api_root_rejected() {
        let config = FrameworkConfig {
            api_root: "my api".into(),
            ..FrameworkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
