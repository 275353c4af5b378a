//! Decision types for evaluated deliveries.

use hooksync_verify::{Acceptance, Rejection};

/// Terminal state of one delivery.
///
/// ```text
/// Received → Resolving ─┬─▶ Unresolved
///                       └─▶ Resolved → Verifying ─┬─▶ Accepted
///                                                 └─▶ Rejected
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The delivery names no single tracked repository.
    Unresolved(Unresolved),

    /// The delivery resolved but failed verification.
    Rejected {
        /// Name of the resolved record.
        repository: String,
        /// Why verification failed.
        reason: Rejection,
    },

    /// The delivery resolved and verified.
    Accepted {
        /// Name of the resolved record.
        repository: String,
        /// How it was verified.
        acceptance: Acceptance,
        /// What was done with it.
        action: Action,
    },
}

impl Decision {
    /// Returns true if the delivery was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Returns the resolved repository name, if resolution succeeded.
    pub fn repository(&self) -> Option<&str> {
        match self {
            Self::Unresolved(_) => None,
            Self::Rejected { repository, .. } | Self::Accepted { repository, .. } => {
                Some(repository)
            }
        }
    }
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No record has the notification's URL.
    NotFound,

    /// Several records have the notification's URL.
    Ambiguous {
        /// Names of the conflicting records.
        candidates: Vec<String>,
    },
}

/// What happened to an accepted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Handed to the sync action.
    SyncRequested,

    /// A push to a branch other than the tracked one.
    SkippedBranch {
        /// Branch the record tracks.
        tracked: String,
        /// Ref that was pushed.
        pushed: String,
    },

    /// A ping event; nothing to do.
    Pong,

    /// An event type we do not act on.
    Ignored {
        /// Event name.
        event: String,
    },
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Unresolved(Unresolved::NotFound) => {
                write!(f, "repository is not tracked")
            }
            Decision::Unresolved(Unresolved::Ambiguous { candidates }) => write!(
                f,
                "repository matches {} tracked records: {}",
                candidates.len(),
                candidates.join(", ")
            ),
            Decision::Rejected { repository, reason } => {
                write!(f, "{}: {}", repository, reason)
            }
            Decision::Accepted {
                repository, action, ..
            } => match action {
                Action::SyncRequested => write!(f, "{}: sync requested", repository),
                Action::SkippedBranch { tracked, pushed } => write!(
                    f,
                    "{}: push to {} ignored, tracking {}",
                    repository, pushed, tracked
                ),
                Action::Pong => write!(f, "{}: pong", repository),
                Action::Ignored { event } => {
                    write!(f, "{}: {} event ignored", repository, event)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksync_verify::SignatureAlgorithm;

    #[test]
    fn test_decision_accessors() {
        let accepted = Decision::Accepted {
            repository: "widgets".to_string(),
            acceptance: Acceptance::Unsigned,
            action: Action::Pong,
        };
        assert!(accepted.is_accepted());
        assert_eq!(accepted.repository(), Some("widgets"));

        let unresolved = Decision::Unresolved(Unresolved::NotFound);
        assert!(!unresolved.is_accepted());
        assert_eq!(unresolved.repository(), None);
    }

    #[test]
    fn test_decision_display() {
        let rejected = Decision::Rejected {
            repository: "widgets".to_string(),
            reason: Rejection::SignatureMismatch {
                algorithm: SignatureAlgorithm::Sha1,
                keys_checked: 2,
            },
        };
        assert_eq!(
            rejected.to_string(),
            "widgets: sha1 signature matched none of 2 configured secret(s)"
        );

        let ambiguous = Decision::Unresolved(Unresolved::Ambiguous {
            candidates: vec!["y".to_string(), "y".to_string()],
        });
        assert!(ambiguous.to_string().contains("2 tracked records"));
    }
}
