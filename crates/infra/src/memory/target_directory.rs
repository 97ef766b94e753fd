//! Target directory loaded once from a JSON file
//!
//! The file holds an array of targets:
//!
//! ```json
//! [
//!   { "id": "ana", "kind": "user", "name": "Ana", "lead_quota": 3 },
//!   { "id": "north", "kind": "team", "name": "North",
//!     "members": [{ "id": "m1", "name": "Mia" }, { "id": "m2", "name": "Max", "active": false }] }
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use leadflow_core::TargetDirectory;
use leadflow_domain::{DistributionTarget, LeadflowError, Result as DomainResult};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct StaticTargetDirectory {
    targets: Vec<DistributionTarget>,
}

impl StaticTargetDirectory {
    /// Build a directory, rejecting duplicate target ids.
    pub fn new(targets: Vec<DistributionTarget>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = targets
            .iter()
            .filter(|target| !seen.insert(target.id.as_str()))
            .map(|target| target.id.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(LeadflowError::Config(format!(
                "duplicate target ids: {}",
                duplicates.join(", ")
            )));
        }
        Ok(Self { targets })
    }

    pub fn from_file(path: &Path) -> DomainResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LeadflowError::Config(format!("Failed to read targets file {}: {e}", path.display()))
        })?;
        let targets: Vec<DistributionTarget> = serde_json::from_str(&contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid targets file: {e}")))?;

        info!(path = %path.display(), count = targets.len(), "distribution targets loaded");
        Self::new(targets)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl TargetDirectory for StaticTargetDirectory {
    async fn get_target(&self, id: &str) -> DomainResult<DistributionTarget> {
        self.targets
            .iter()
            .find(|target| target.id == id)
            .cloned()
            .ok_or_else(|| LeadflowError::NotFound(format!("target {id}")))
    }

    async fn list_targets(&self) -> DomainResult<Vec<DistributionTarget>> {
        Ok(self.targets.clone())
    }
}
