//! The route policies directory, seeded with the built-in policies.

use serde::{Deserialize, Serialize};

use super::{ROUTE_POLICIES, SERVICE_NAME};
use crate::directory::ResourceDirectory;
use crate::error::Result;
use crate::validation::{validate_field, Required, Validate, ValidationErrors, ValidationResult};

/// A route selection policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPayload {
    pub name: String,
}

impl PolicyPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Validate for PolicyPayload {
    fn validate(&self) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_field(&mut errors, "name", &self.name, &[&Required]);
        errors.into_result()
    }
}

/// Build the policies directory with the `fastest` and `shortest` policies
/// already present.
pub fn policies_directory() -> Result<ResourceDirectory<PolicyPayload>> {
    let directory = ResourceDirectory::builder(SERVICE_NAME, ROUTE_POLICIES).build();
    for name in ["fastest", "shortest"] {
        directory.create(PolicyPayload::new(name))?;
    }
    Ok(directory)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ChangeAction, ListRange};

    #[test]
    fn test_seeded_policies_in_insertion_order() {
        let directory = policies_directory().unwrap();

        let names: Vec<_> = directory
            .list(ListRange::all())
            .iter()
            .map(|e| e.payload().name)
            .collect();
        assert_eq!(names, ["fastest", "shortest"]);
    }

    #[test]
    fn test_seeded_policies_have_distinct_ids_and_uris() {
        let directory = policies_directory().unwrap();
        let policies = directory.list(ListRange::all());

        assert_ne!(policies[0].id(), policies[1].id());
        assert!(policies[0]
            .uri()
            .starts_with("/routeplanning/routepolicies/"));
    }

    #[test]
    fn test_latest_structural_event_after_seeding_is_add() {
        tokio_test::block_on(async {
            let directory = policies_directory().unwrap();
            let mut sub = directory.subscribe();
            assert_eq!(sub.recv().await.unwrap().action, ChangeAction::Add);
        });
    }
}
