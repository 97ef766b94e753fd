//! Domain types and models

pub mod claim;
pub mod distribution;
pub mod lead;
pub mod sla;
pub mod wallet;

pub use claim::{ClaimAttempt, ClaimOutcome};
pub use distribution::{
    AllocationPreview, AllocationRow, AllocationTotals, DistributionScope, DistributionTarget,
    Member, StrategyType, TargetKind, UnitBucket,
};
pub use lead::{HistoryAction, Lead, LeadHistoryEntry, LeadPatch, LeadStage, PoolFilter};
pub use sla::{LeadTemperature, SlaStatus, SlaThresholds, StalenessBucket};
pub use wallet::{
    RedistributionAction, RedistributionFilters, RedistributionPreview, WalletSummary,
};
