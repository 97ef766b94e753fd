//! Distribution targets, scope and allocation results

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::sla::LeadTemperature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    RoundRobin,
    Weighted,
    ByTeam,
    ByStore,
}

impl_domain_status_conversions!(StrategyType {
    RoundRobin => "round_robin",
    Weighted => "weighted",
    ByTeam => "by_team",
    ByStore => "by_store",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    User,
    Team,
    Store,
}

impl_domain_status_conversions!(TargetKind {
    User => "user",
    Team => "team",
    Store => "store",
});

/// A roster entry of a team or store target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A destination for redistributed leads and properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionTarget {
    pub id: String,
    pub kind: TargetKind,
    pub name: String,
    /// Weight for lead buckets (weighted strategy only)
    #[serde(default)]
    pub lead_quota: Option<u32>,
    /// Weight for properties (weighted strategy only)
    #[serde(default)]
    pub property_quota: Option<u32>,
    /// Roster used by the team and store strategies
    #[serde(default)]
    pub members: Vec<Member>,
}

impl DistributionTarget {
    pub fn new(id: impl Into<String>, kind: TargetKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            lead_quota: None,
            property_quota: None,
            members: Vec::new(),
        }
    }

    pub fn with_quotas(mut self, leads: Option<u32>, properties: Option<u32>) -> Self {
        self.lead_quota = leads;
        self.property_quota = properties;
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    /// Quota that applies to `bucket`, zero when unset.
    pub fn quota_for(&self, bucket: UnitBucket) -> u64 {
        let quota = if bucket.is_lead() { self.lead_quota } else { self.property_quota };
        u64::from(quota.unwrap_or(0))
    }

    pub fn active_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|member| member.active)
    }
}

/// One of the four unit kinds an allocation splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitBucket {
    Hot,
    Warm,
    Cold,
    Properties,
}

impl UnitBucket {
    /// Allocation order; rows and remainders follow it.
    pub const ALL: [Self; 4] = [Self::Hot, Self::Warm, Self::Cold, Self::Properties];

    pub fn is_lead(self) -> bool {
        !matches!(self, Self::Properties)
    }
}

impl From<LeadTemperature> for UnitBucket {
    fn from(temperature: LeadTemperature) -> Self {
        match temperature {
            LeadTemperature::Hot => Self::Hot,
            LeadTemperature::Warm => Self::Warm,
            LeadTemperature::Cold => Self::Cold,
        }
    }
}

impl_domain_status_conversions!(UnitBucket {
    Hot => "hot",
    Warm => "warm",
    Cold => "cold",
    Properties => "properties",
});

/// Which buckets take part in an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionScope {
    pub hot: bool,
    pub warm: bool,
    pub cold: bool,
    pub properties: bool,
}

impl Default for DistributionScope {
    fn default() -> Self {
        Self { hot: true, warm: true, cold: true, properties: false }
    }
}

impl DistributionScope {
    pub fn all() -> Self {
        Self { hot: true, warm: true, cold: true, properties: true }
    }

    pub fn includes(&self, bucket: UnitBucket) -> bool {
        match bucket {
            UnitBucket::Hot => self.hot,
            UnitBucket::Warm => self.warm,
            UnitBucket::Cold => self.cold,
            UnitBucket::Properties => self.properties,
        }
    }

    pub fn included(&self) -> impl Iterator<Item = UnitBucket> + '_ {
        UnitBucket::ALL.into_iter().filter(|bucket| self.includes(*bucket))
    }

    pub fn is_empty(&self) -> bool {
        self.included().next().is_none()
    }
}

/// Units available for allocation, per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTotals {
    #[serde(default)]
    pub leads_hot: u64,
    #[serde(default)]
    pub leads_warm: u64,
    #[serde(default)]
    pub leads_cold: u64,
    #[serde(default)]
    pub properties: u64,
}

impl AllocationTotals {
    pub fn get(&self, bucket: UnitBucket) -> u64 {
        match bucket {
            UnitBucket::Hot => self.leads_hot,
            UnitBucket::Warm => self.leads_warm,
            UnitBucket::Cold => self.leads_cold,
            UnitBucket::Properties => self.properties,
        }
    }

    /// Sum of all four buckets, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        UnitBucket::ALL.into_iter().fold(0, |sum: u64, bucket| sum.saturating_add(self.get(bucket)))
    }

    /// Sum of all four buckets, `None` on overflow.
    pub fn checked_total(&self) -> Option<u64> {
        UnitBucket::ALL
            .into_iter()
            .try_fold(0u64, |sum, bucket| sum.checked_add(self.get(bucket)))
    }

    /// Copy with every bucket outside `scope` zeroed.
    pub fn scoped(&self, scope: &DistributionScope) -> Self {
        let pick = |bucket: UnitBucket| if scope.includes(bucket) { self.get(bucket) } else { 0 };
        Self {
            leads_hot: pick(UnitBucket::Hot),
            leads_warm: pick(UnitBucket::Warm),
            leads_cold: pick(UnitBucket::Cold),
            properties: pick(UnitBucket::Properties),
        }
    }
}

/// Per-destination breakdown of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub destination_id: String,
    pub name: String,
    /// Team or store the member row belongs to
    pub parent_id: Option<String>,
    pub leads_hot: u64,
    pub leads_warm: u64,
    pub leads_cold: u64,
    pub properties: u64,
    pub total: u64,
}

impl AllocationRow {
    pub fn new(
        destination_id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            destination_id: destination_id.into(),
            name: name.into(),
            parent_id,
            leads_hot: 0,
            leads_warm: 0,
            leads_cold: 0,
            properties: 0,
            total: 0,
        }
    }

    pub fn get(&self, bucket: UnitBucket) -> u64 {
        match bucket {
            UnitBucket::Hot => self.leads_hot,
            UnitBucket::Warm => self.leads_warm,
            UnitBucket::Cold => self.leads_cold,
            UnitBucket::Properties => self.properties,
        }
    }

    pub fn add(&mut self, bucket: UnitBucket, units: u64) {
        let slot = match bucket {
            UnitBucket::Hot => &mut self.leads_hot,
            UnitBucket::Warm => &mut self.leads_warm,
            UnitBucket::Cold => &mut self.leads_cold,
            UnitBucket::Properties => &mut self.properties,
        };
        *slot = slot.saturating_add(units);
        self.total = self.total.saturating_add(units);
    }
}

/// Rows, a totals row and every warning raised while allocating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPreview {
    pub strategy: StrategyType,
    pub rows: Vec<AllocationRow>,
    pub totals: AllocationRow,
    /// Units left over once every member hit its cap
    pub unassigned: u64,
    pub warnings: Vec<String>,
}
