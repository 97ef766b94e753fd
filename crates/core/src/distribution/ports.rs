//! Port for resolving destination targets

use async_trait::async_trait;
use leadflow_domain::{DistributionTarget, Result};

/// Directory of agents, teams and stores that can receive leads.
#[async_trait]
pub trait TargetDirectory: Send + Sync {
    /// # Errors
    /// `LeadflowError::NotFound` when the id is unknown.
    async fn get_target(&self, id: &str) -> Result<DistributionTarget>;

    async fn list_targets(&self) -> Result<Vec<DistributionTarget>>;
}
