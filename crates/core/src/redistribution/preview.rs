//! Wallet scope preview

use leadflow_domain::{
    AllocationTotals, LeadTemperature, RedistributionAction, RedistributionFilters,
    RedistributionPreview, WalletSummary,
};

/// Turn a wallet plus filters into the counts a bulk action would touch.
///
/// The whole selection goes to `to_redistribute` or `to_archive` depending on
/// `action`; `remaining` is what the filters leave in the wallet.
pub fn preview(
    wallet: &WalletSummary,
    filters: &RedistributionFilters,
    action: RedistributionAction,
) -> RedistributionPreview {
    let pick = |temperature: LeadTemperature| {
        if filters.includes(temperature) {
            wallet.count(temperature)
        } else {
            0
        }
    };

    let breakdown = AllocationTotals {
        leads_hot: pick(LeadTemperature::Hot),
        leads_warm: pick(LeadTemperature::Warm),
        leads_cold: pick(LeadTemperature::Cold),
        properties: 0,
    };
    let selected_total = breakdown.total();

    let (to_redistribute, to_archive) = match action {
        RedistributionAction::Redistribute => (selected_total, 0),
        RedistributionAction::Archive => (0, selected_total),
    };

    RedistributionPreview {
        selected_total,
        to_redistribute,
        to_archive,
        remaining: wallet.total.saturating_sub(selected_total),
        breakdown,
    }
}
