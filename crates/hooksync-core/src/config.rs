//! Configuration types for hooksync.

use crate::error::HooksyncError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths reserved for the probe endpoints.
pub const RESERVED_PATHS: [&str; 2] = ["/_ready", "/_alive"];

/// Runtime configuration for the webhook receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksyncConfig {
    /// TCP port to listen on.
    pub listen_port: u16,

    /// Path the webhook endpoint is mounted at.
    pub endpoint_path: String,

    /// Root directory repositories are synced into.
    pub repo_root: PathBuf,

    /// Directory of YAML repository records.
    pub repo_source: PathBuf,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for HooksyncConfig {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            endpoint_path: "/webhook".to_string(),
            repo_root: PathBuf::from("./repos"),
            repo_source: PathBuf::from("./repo_source"),
            max_body_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

impl HooksyncConfig {
    /// Reads a JSON configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `HooksyncError::Config` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HooksyncError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| HooksyncError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `HooksyncError::Config` if the endpoint path is not absolute,
    /// contains route captures or wildcards, collides with a probe path, or
    /// the body limit is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.endpoint_path.starts_with('/') {
            return Err(HooksyncError::Config(format!(
                "endpoint path must start with '/': {}",
                self.endpoint_path
            )));
        }

        if self.endpoint_path.contains(&['{', '}', '*'][..]) {
            return Err(HooksyncError::Config(format!(
                "endpoint path must be a literal path without '{{', '}}' or '*': {}",
                self.endpoint_path
            )));
        }

        if RESERVED_PATHS.contains(&self.endpoint_path.as_str()) {
            return Err(HooksyncError::Config(format!(
                "endpoint path {} is reserved for probes",
                self.endpoint_path
            )));
        }

        if self.max_body_bytes == 0 {
            return Err(HooksyncError::Config(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HooksyncConfig::default();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.endpoint_path, "/webhook");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: HooksyncConfig =
            serde_json::from_str(r#"{"listen_port": 9000, "repo_root": "/srv/repos"}"#).unwrap();
        assert_eq!(parsed.listen_port, 9000);
        assert_eq!(parsed.repo_root, PathBuf::from("/srv/repos"));
        assert_eq!(parsed.endpoint_path, "/webhook");
    }

    #[test]
    fn test_validate_rejects_bad_paths() {
        let mut config = HooksyncConfig::default();

        config.endpoint_path = "webhook".to_string();
        assert!(config.validate().is_err());

        config.endpoint_path = "/_ready".to_string();
        assert!(config.validate().is_err());

        for path in ["/hooks/{", "/hooks/}", "/hooks/{id}", "/hooks/*rest", "/{*rest}"] {
            config.endpoint_path = path.to_string();
            assert!(
                matches!(config.validate(), Err(HooksyncError::Config(_))),
                "{} should be rejected",
                path
            );
        }

        config.endpoint_path = "/hooks/github".to_string();
        assert!(config.validate().is_ok());

        config.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }
}
