//! # Repository Resolver
//!
//! Maps the repository identity carried by a notification onto exactly one
//! registry record.
//!
//! A record matches when its `url` is byte-for-byte equal to either the
//! notification's HTTPS clone URL or its SSH URL. No normalization is applied
//! here. Two or more matches are reported as [`Resolution::Ambiguous`]; the
//! resolver never picks one of them.
//!
//! The resolver does no I/O and never looks at secrets, so "which repository
//! is this" can be tested and audited separately from "is this request
//! authentic".

use crate::models::RepositoryRecord;

/// Repository identity extracted from an inbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryRef<'a> {
    /// HTTPS clone URL (`repository.clone_url`).
    pub http_url: &'a str,

    /// SSH clone URL (`repository.ssh_url`).
    pub ssh_url: &'a str,
}

impl<'a> RepositoryRef<'a> {
    /// Creates a reference from the two notification URLs.
    pub fn new(http_url: &'a str, ssh_url: &'a str) -> Self {
        RepositoryRef { http_url, ssh_url }
    }

    fn matches(&self, record: &RepositoryRecord) -> bool {
        let url = record.url();
        !url.is_empty() && (url == self.http_url || url == self.ssh_url)
    }
}

/// Outcome of resolving a notification against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'r> {
    /// Exactly one record matched.
    Resolved(&'r RepositoryRecord),

    /// No record matched.
    NotFound,

    /// More than one record matched. This is a registry misconfiguration.
    Ambiguous {
        /// Names of every matching record, in registry order.
        candidates: Vec<&'r str>,
    },
}

impl<'r> Resolution<'r> {
    /// Returns the record if resolution succeeded.
    pub fn record(&self) -> Option<&'r RepositoryRecord> {
        match self {
            Resolution::Resolved(record) => Some(record),
            _ => None,
        }
    }
}

/// Resolves `target` against `candidates`.
///
/// Every candidate is examined so that ambiguity is always detected.
///
/// # Example
///
/// ```rust
/// use hooksync_registry::{resolve, RepositoryRecord, RepositoryRef, Resolution};
///
/// let records = vec![
///     RepositoryRecord::new("https://github.com/acme/widgets.git"),
///     RepositoryRecord::new("git@github.com:acme/gadgets.git"),
/// ];
///
/// let target = RepositoryRef::new(
///     "https://github.com/acme/gadgets.git",
///     "git@github.com:acme/gadgets.git",
/// );
///
/// match resolve(records.iter(), &target) {
///     Resolution::Resolved(record) => assert_eq!(record.name(), "gadgets"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn resolve<'r, I>(candidates: I, target: &RepositoryRef<'_>) -> Resolution<'r>
where
    I: IntoIterator<Item = &'r RepositoryRecord>,
{
    let matches: Vec<&'r RepositoryRecord> = candidates
        .into_iter()
        .filter(|record| target.matches(record))
        .collect();

    match matches.as_slice() {
        [] => Resolution::NotFound,
        [record] => Resolution::Resolved(*record),
        many => Resolution::Ambiguous {
            candidates: many.iter().copied().map(RepositoryRecord::name).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<RepositoryRecord> {
        vec![
            RepositoryRecord::new("https://github.com/acme/widgets.git"),
            RepositoryRecord::new("git@github.com:acme/gadgets.git"),
        ]
    }

    #[test]
    fn test_resolve_by_http_url() {
        let records = records();
        let target = RepositoryRef::new("https://github.com/acme/widgets.git", "");
        let resolution = resolve(records.iter(), &target);
        assert_eq!(resolution.record().map(|r| r.name()), Some("widgets"));
    }

    #[test]
    fn test_resolve_by_ssh_url() {
        let records = records();
        let target = RepositoryRef::new("", "git@github.com:acme/gadgets.git");
        let resolution = resolve(records.iter(), &target);
        assert_eq!(resolution.record().map(|r| r.name()), Some("gadgets"));
    }

    #[test]
    fn test_no_normalization() {
        let records = records();
        let target = RepositoryRef::new("https://github.com/acme/widgets", "");
        assert_eq!(resolve(records.iter(), &target), Resolution::NotFound);

        let target = RepositoryRef::new("https://GitHub.com/acme/widgets.git", "");
        assert_eq!(resolve(records.iter(), &target), Resolution::NotFound);
    }

    #[test]
    fn test_empty_identity_matches_nothing() {
        let records = records();
        let target = RepositoryRef::new("", "");
        assert_eq!(resolve(records.iter(), &target), Resolution::NotFound);
    }

    #[test]
    fn test_ambiguous_lists_all_candidates() {
        let records = vec![
            RepositoryRecord::new("https://x/y.git"),
            RepositoryRecord::new("https://x/other.git"),
            RepositoryRecord::new("https://x/y.git"),
        ];
        let target = RepositoryRef::new("https://x/y.git", "");

        match resolve(records.iter(), &target) {
            Resolution::Ambiguous { candidates } => assert_eq!(candidates, vec!["y", "y"]),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_http_and_ssh_records_for_same_repo_are_ambiguous() {
        let records = vec![
            RepositoryRecord::new("https://github.com/acme/widgets.git"),
            RepositoryRecord::new("git@github.com:acme/widgets.git"),
        ];
        let target = RepositoryRef::new(
            "https://github.com/acme/widgets.git",
            "git@github.com:acme/widgets.git",
        );
        assert!(matches!(
            resolve(records.iter(), &target),
            Resolution::Ambiguous { .. }
        ));
    }
}
