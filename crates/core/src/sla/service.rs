//! Staleness service - thresholds plus the pure classifier

use std::sync::Arc;

use leadflow_domain::{Lead, LeadTemperature, Result, SlaThresholds, StalenessBucket, WalletSummary};
use tracing::info;

use super::classifier::{classify_elapsed, temperature};
use super::ports::ThresholdStore;
use crate::clock::Clock;
use crate::leads::ports::LeadStore;

/// Classifies leads against the thresholds current at call time.
///
/// Nothing is cached: every call reads the threshold store, so an operator
/// update applies to the very next classification.
pub struct StalenessService {
    thresholds: Arc<dyn ThresholdStore>,
    leads: Arc<dyn LeadStore>,
    clock: Arc<dyn Clock>,
}

impl StalenessService {
    pub fn new(
        thresholds: Arc<dyn ThresholdStore>,
        leads: Arc<dyn LeadStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { thresholds, leads, clock }
    }

    pub async fn thresholds(&self) -> Result<SlaThresholds> {
        self.thresholds.get_thresholds().await
    }

    /// Validate and store new thresholds.
    ///
    /// # Errors
    /// `LeadflowError::Validation` unless `0 < low < mid <= 365`; nothing is
    /// written in that case.
    pub async fn set_thresholds(&self, low_max: u32, mid_max: u32) -> Result<SlaThresholds> {
        let thresholds = SlaThresholds::new(low_max, mid_max)?;
        self.thresholds.set_thresholds(thresholds).await?;
        info!(low_max, mid_max, "sla thresholds updated");
        Ok(thresholds)
    }

    pub async fn classify_lead(&self, lead: &Lead) -> Result<StalenessBucket> {
        let thresholds = self.thresholds.get_thresholds().await?;
        Ok(classify_elapsed(self.clock.now(), lead.last_contact_at, &thresholds))
    }

    /// Every lead owned by `agent_id` with its temperature, ordered by id.
    pub async fn wallet_leads(&self, agent_id: &str) -> Result<Vec<(Lead, LeadTemperature)>> {
        let thresholds = self.thresholds.get_thresholds().await?;
        let now = self.clock.now();
        let mut leads = self.leads.list_by_owner(agent_id).await?;
        leads.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(leads
            .into_iter()
            .map(|lead| {
                let temp = temperature(now, lead.last_contact_at, &thresholds);
                (lead, temp)
            })
            .collect())
    }

    pub async fn wallet_for(&self, agent_id: &str) -> Result<WalletSummary> {
        let leads = self.wallet_leads(agent_id).await?;
        Ok(WalletSummary::from_buckets(agent_id, leads.into_iter().map(|(_, temp)| temp)))
    }
}
