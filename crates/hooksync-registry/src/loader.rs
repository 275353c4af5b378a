//! # Record Source Loader
//!
//! Reads one YAML record per file from a source directory and turns each
//! into a validated [`RepositoryRecord`].
//!
//! ## Record Format
//!
//! | Field | Type | Default | Notes |
//! |-------|------|---------|-------|
//! | `url` | string | required | clone URL, matching key |
//! | `branch` | string | `""` | empty means default branch |
//! | `webhook_secret` | string | none | primary secret |
//! | `webhook_secrets` | list | `[]` | additional secrets for rotation |
//! | `username` | string | none | sync credential |
//! | `password_token` | string | none | sync credential |
//! | `ssh_key` | string | none | sync credential |
//! | `webhook_secret_required` | bool | `true` | `false` disables signature checks |
//!
//! `name` and `protocol` are always derived from `url`. If a file sets them
//! they are ignored with a warning.
//!
//! Files are read in file-name order so the resulting registry is
//! deterministic. Only `.yaml` and `.yml` files are considered.

use crate::models::{Credentials, RegistryError, RepositoryRecord, Result, Secret};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk shape of one record file.
#[derive(Deserialize)]
struct RecordFile {
    #[serde(default)]
    url: String,

    #[serde(default)]
    branch: Option<String>,

    #[serde(default)]
    webhook_secret: Option<String>,

    #[serde(default)]
    webhook_secrets: Vec<String>,

    #[serde(default)]
    username: Option<String>,

    #[serde(default)]
    password_token: Option<String>,

    #[serde(default)]
    ssh_key: Option<String>,

    #[serde(default = "default_secret_required")]
    webhook_secret_required: bool,

    // Derived fields; accepted only so we can warn about them.
    #[serde(default)]
    name: Option<serde_yaml::Value>,

    #[serde(default)]
    protocol: Option<serde_yaml::Value>,
}

fn default_secret_required() -> bool {
    true
}

impl RecordFile {
    fn into_record(self) -> RepositoryRecord {
        let secrets = self
            .webhook_secret
            .into_iter()
            .chain(self.webhook_secrets)
            .map(Secret::new);

        RepositoryRecord::new(self.url.trim())
            .with_branch(self.branch.unwrap_or_default().trim())
            .with_secrets(secrets)
            .with_secret_required(self.webhook_secret_required)
            .with_credentials(Credentials {
                username: self.username,
                password_token: self.password_token,
                ssh_key: self.ssh_key,
            })
    }
}

/// Parses and validates a single record.
///
/// `origin` is used in error messages and logs, typically the file path.
///
/// # Errors
///
/// - `RegistryError::Yaml` if the text is not a valid record document
/// - `RegistryError::InvalidRecord` if the record fails validation
///
/// # Example
///
/// ```rust
/// use hooksync_registry::loader::parse_record;
/// use std::path::Path;
///
/// let record = parse_record(
///     "url: https://github.com/acme/widgets.git\nwebhook_secret: s3cr3t\n",
///     Path::new("widgets.yaml"),
/// )
/// .unwrap();
///
/// assert_eq!(record.name(), "widgets");
/// assert_eq!(record.secrets().len(), 1);
/// ```
pub fn parse_record(text: &str, origin: &Path) -> Result<RepositoryRecord> {
    let file: RecordFile = serde_yaml::from_str(text).map_err(|source| RegistryError::Yaml {
        path: origin.to_path_buf(),
        source,
    })?;

    if file.name.is_some() || file.protocol.is_some() {
        warn!(
            file = %origin.display(),
            "record sets name/protocol; these are derived from url and the given values are ignored"
        );
    }

    let record = file.into_record();
    record
        .validate()
        .map_err(|err| match err {
            RegistryError::InvalidRecord { reason, .. } => RegistryError::InvalidRecord {
                origin: origin.display().to_string(),
                reason,
            },
            other => other,
        })?;

    Ok(record)
}

/// Lists the record files of a source directory in file-name order.
fn record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Loads every record in a source directory.
///
/// All-or-nothing: the first invalid file aborts the load and no records are
/// returned.
///
/// # Errors
///
/// - `RegistryError::Io` if the directory or a file cannot be read
/// - `RegistryError::Yaml` / `RegistryError::InvalidRecord` for bad records
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<RepositoryRecord>> {
    let dir = dir.as_ref();
    let mut records = Vec::new();

    for path in record_files(dir)? {
        let text = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;
        let record = parse_record(&text, &path)?;
        debug!(file = %path.display(), repository = %record.name(), "loaded record");
        records.push(record);
    }

    if records.is_empty() {
        warn!(dir = %dir.display(), "record source contains no repository records");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn origin() -> &'static Path {
        Path::new("test.yaml")
    }

    #[test]
    fn test_parse_full_record() {
        let text = r#"
url: git@github.com:acme/widgets.git
branch: release
webhook_secret: primary
webhook_secrets: [rotated, primary]
username: bot
password_token: tok
ssh_key: /keys/id_ed25519
"#;
        let record = parse_record(text, origin()).unwrap();

        assert_eq!(record.name(), "widgets");
        assert_eq!(record.protocol(), "ssh");
        assert_eq!(record.branch(), "release");
        assert_eq!(record.secrets().len(), 2);
        assert!(record.secret_required());
        assert_eq!(record.credentials().username.as_deref(), Some("bot"));
    }

    #[test]
    fn test_secret_required_defaults_true() {
        let err = parse_record("url: https://x/y.git\n", origin()).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("test.yaml"));
    }

    #[test]
    fn test_unsigned_record_without_secret() {
        let record = parse_record(
            "url: https://x/y.git\nwebhook_secret_required: false\n",
            origin(),
        )
        .unwrap();
        assert!(!record.secret_required());
        assert!(record.secrets().is_empty());
    }

    #[test]
    fn test_name_in_file_is_ignored() {
        let record = parse_record(
            "name: impostor\nprotocol: ftp\nurl: https://x/real.git\nwebhook_secret: s\n",
            origin(),
        )
        .unwrap();
        assert_eq!(record.name(), "real");
        assert_eq!(record.protocol(), "https");
    }

    #[test]
    fn test_missing_url_rejected() {
        let err = parse_record("webhook_secret: s\n", origin()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRecord { .. }));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = parse_record("url: [unterminated\n", origin()).unwrap_err();
        assert!(matches!(err, RegistryError::Yaml { .. }));
    }

    #[test]
    fn test_load_dir_orders_by_file_name_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yaml"), "url: https://x/b.git\nwebhook_secret: s\n").unwrap();
        fs::write(dir.path().join("a.yml"), "url: https://x/a.git\nwebhook_secret: s\n").unwrap();
        fs::write(dir.path().join("README.md"), "not a record").unwrap();

        let records = load_dir(dir.path()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_dir_fails_on_any_invalid_record() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "url: https://x/a.git\nwebhook_secret: s\n").unwrap();
        fs::write(dir.path().join("b.yaml"), "url: https://x/b.git\n").unwrap();

        assert!(load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let err = load_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
        assert!(!err.is_config_error());
    }
}
