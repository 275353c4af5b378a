//! Unit tests for hooksync-core.

#[test]
fn test_crate_structure() {
    // Smoke test - verifies the public surface is wired together
    use crate::{Action, Decision, HooksyncConfig, Unresolved};

    assert!(HooksyncConfig::default().validate().is_ok());

    let unresolved = Decision::Unresolved(Unresolved::NotFound);
    assert!(!unresolved.is_accepted());
    assert_eq!(unresolved.to_string(), "repository is not tracked");

    let ignored = Decision::Accepted {
        repository: "widgets".to_string(),
        acceptance: crate::Acceptance::Unsigned,
        action: Action::Ignored {
            event: "issues".to_string(),
        },
    };
    assert!(ignored.is_accepted());
    assert_eq!(ignored.to_string(), "widgets: issues event ignored");
}
