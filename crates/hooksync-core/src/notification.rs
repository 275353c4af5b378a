//! Inbound notification envelope.
//!
//! Only the fields the trust pipeline needs are read from the provider
//! payload; everything else is ignored.

use crate::error::HooksyncError;
use hooksync_registry::RepositoryRef;
use serde::Deserialize;
use std::fmt;

/// Prefix of branch refs in push payloads.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Event named by the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A push to the repository.
    Push,
    /// Sent once when a hook is created.
    Ping,
    /// Any other event.
    Other(String),
}

impl EventKind {
    /// Parses the header value. A missing header is treated as `push`.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            None => EventKind::Push,
            Some(v) if v == "push" => EventKind::Push,
            Some(v) if v == "ping" => EventKind::Ping,
            Some(v) => EventKind::Other(v),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Push => f.write_str("push"),
            EventKind::Ping => f.write_str("ping"),
            EventKind::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Deserialize)]
struct Payload {
    repository: Option<RepositoryPayload>,

    #[serde(default)]
    before: String,

    #[serde(default)]
    after: String,

    #[serde(rename = "ref", default)]
    git_ref: Option<String>,
}

#[derive(Deserialize)]
struct RepositoryPayload {
    #[serde(default)]
    name: String,

    #[serde(default)]
    full_name: String,

    #[serde(default)]
    clone_url: String,

    #[serde(default)]
    ssh_url: String,
}

/// The parsed subset of a provider push event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundNotification {
    /// `repository.clone_url`.
    pub repository_url_http: String,

    /// `repository.ssh_url`.
    pub repository_url_ssh: String,

    /// `repository.full_name`, e.g. `acme/widgets`.
    pub repository_full_name: String,

    /// `repository.name`.
    pub repository_name: String,

    /// Commit before the push.
    pub commit_before: String,

    /// Commit after the push.
    pub commit_after: String,

    /// Pushed ref, e.g. `refs/heads/main`.
    pub git_ref: Option<String>,
}

impl InboundNotification {
    /// Parses a notification from the raw request body.
    ///
    /// # Errors
    ///
    /// Returns `HooksyncError::Notification` if the body is not JSON or has no
    /// `repository` object.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let payload: Payload = serde_json::from_slice(body)
            .map_err(|e| HooksyncError::Notification(format!("invalid JSON: {}", e)))?;

        let repository = payload.repository.ok_or_else(|| {
            HooksyncError::Notification("payload has no repository object".to_string())
        })?;

        Ok(InboundNotification {
            repository_url_http: repository.clone_url,
            repository_url_ssh: repository.ssh_url,
            repository_full_name: repository.full_name,
            repository_name: repository.name,
            commit_before: payload.before,
            commit_after: payload.after,
            git_ref: payload.git_ref,
        })
    }

    /// Repository identity used for resolution.
    pub fn repository_ref(&self) -> RepositoryRef<'_> {
        RepositoryRef::new(&self.repository_url_http, &self.repository_url_ssh)
    }

    /// Branch name if the pushed ref is a branch.
    pub fn pushed_branch(&self) -> Option<&str> {
        self.git_ref
            .as_deref()
            .and_then(|r| r.strip_prefix(BRANCH_REF_PREFIX))
    }
}

impl fmt::Display for InboundNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, ssh_url: <{}>, http_url: <{}>, after: {}",
            self.repository_full_name, self.repository_url_ssh, self.repository_url_http, self.commit_after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH: &str = r#"{
        "ref": "refs/heads/main",
        "before": "0000000000000000000000000000000000000000",
        "after": "c18ad04687e0f9651d473212ab8fa8d6643f7c58",
        "repository": {
            "id": 1,
            "name": "widgets",
            "full_name": "acme/widgets",
            "private": false,
            "clone_url": "https://github.com/acme/widgets.git",
            "ssh_url": "git@github.com:acme/widgets.git"
        },
        "pusher": {"name": "octocat", "email": "octocat@example.com"}
    }"#;

    #[test]
    fn test_parse_push() {
        let n = InboundNotification::from_slice(PUSH.as_bytes()).unwrap();
        assert_eq!(n.repository_url_http, "https://github.com/acme/widgets.git");
        assert_eq!(n.repository_url_ssh, "git@github.com:acme/widgets.git");
        assert_eq!(n.repository_full_name, "acme/widgets");
        assert_eq!(n.commit_after, "c18ad04687e0f9651d473212ab8fa8d6643f7c58");
        assert_eq!(n.pushed_branch(), Some("main"));
    }

    #[test]
    fn test_tag_ref_is_not_a_branch() {
        let n = InboundNotification {
            git_ref: Some("refs/tags/v1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(n.pushed_branch(), None);
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(
            InboundNotification::from_slice(b"payload=%7B%7D"),
            Err(HooksyncError::Notification(_))
        ));
    }

    #[test]
    fn test_rejects_missing_repository() {
        assert!(matches!(
            InboundNotification::from_slice(br#"{"after":"abc123"}"#),
            Err(HooksyncError::Notification(_))
        ));
    }

    #[test]
    fn test_event_kind_from_header() {
        assert_eq!(EventKind::from_header(None), EventKind::Push);
        assert_eq!(EventKind::from_header(Some("push")), EventKind::Push);
        assert_eq!(EventKind::from_header(Some("Ping")), EventKind::Ping);
        assert_eq!(
            EventKind::from_header(Some("issues")),
            EventKind::Other("issues".to_string())
        );
    }
}
