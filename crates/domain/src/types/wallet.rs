//! Agent wallets and redistribution previews

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::distribution::{AllocationTotals, DistributionScope};
use crate::types::sla::LeadTemperature;

/// Lead counts per temperature for one agent's portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub agent_id: String,
    pub hot: u64,
    pub warm: u64,
    pub cold: u64,
    pub total: u64,
}

impl WalletSummary {
    /// Count temperatures into a summary whose total is the sum of buckets.
    pub fn from_buckets<I>(agent_id: impl Into<String>, temperatures: I) -> Self
    where
        I: IntoIterator<Item = LeadTemperature>,
    {
        let mut summary = Self { agent_id: agent_id.into(), ..Self::default() };
        for temperature in temperatures {
            match temperature {
                LeadTemperature::Hot => summary.hot += 1,
                LeadTemperature::Warm => summary.warm += 1,
                LeadTemperature::Cold => summary.cold += 1,
            }
            summary.total += 1;
        }
        summary
    }

    pub fn count(&self, temperature: LeadTemperature) -> u64 {
        match temperature {
            LeadTemperature::Hot => self.hot,
            LeadTemperature::Warm => self.warm,
            LeadTemperature::Cold => self.cold,
        }
    }
}

/// Temperature buckets selected for a bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionFilters {
    pub hot: bool,
    pub warm: bool,
    pub cold: bool,
}

impl Default for RedistributionFilters {
    fn default() -> Self {
        Self { hot: true, warm: true, cold: true }
    }
}

impl RedistributionFilters {
    pub fn includes(&self, temperature: LeadTemperature) -> bool {
        match temperature {
            LeadTemperature::Hot => self.hot,
            LeadTemperature::Warm => self.warm,
            LeadTemperature::Cold => self.cold,
        }
    }

    /// Distribution scope covering the selected lead buckets, no properties.
    pub fn to_scope(&self) -> DistributionScope {
        DistributionScope { hot: self.hot, warm: self.warm, cold: self.cold, properties: false }
    }
}

/// Top-level choice applied to the whole selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionAction {
    Redistribute,
    Archive,
}

impl_domain_status_conversions!(RedistributionAction {
    Redistribute => "redistribute",
    Archive => "archive",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionPreview {
    pub selected_total: u64,
    pub to_redistribute: u64,
    pub to_archive: u64,
    pub remaining: u64,
    /// Selected counts per bucket, ready to feed an allocation
    pub breakdown: AllocationTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_buckets_counts_each_temperature() {
        let wallet = WalletSummary::from_buckets(
            "agent-1",
            [LeadTemperature::Hot, LeadTemperature::Cold, LeadTemperature::Hot],
        );
        assert_eq!((wallet.hot, wallet.warm, wallet.cold, wallet.total), (2, 0, 1, 3));
        assert_eq!(wallet.count(LeadTemperature::Hot), 2);
    }

    #[test]
    fn filters_map_to_lead_only_scope() {
        let filters = RedistributionFilters { hot: true, warm: false, cold: true };
        let scope = filters.to_scope();
        assert!(scope.hot && !scope.warm && scope.cold && !scope.properties);
    }
}
