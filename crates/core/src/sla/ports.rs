//! Port for the process-wide SLA thresholds

use async_trait::async_trait;
use leadflow_domain::{Result, SlaThresholds};

/// Single authoritative home of the staleness thresholds.
///
/// Last write wins; readers must fetch on every classification.
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    async fn get_thresholds(&self) -> Result<SlaThresholds>;

    async fn set_thresholds(&self, thresholds: SlaThresholds) -> Result<()>;
}
