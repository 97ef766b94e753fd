//! Command-line surface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadflow_domain::constants::MAX_TICKET_SLA_HOURS;
use leadflow_domain::{
    AllocationTotals, DistributionScope, LeadTemperature, RedistributionAction,
    RedistributionFilters, StrategyType, UnitBucket,
};

#[derive(Debug, Parser)]
#[command(name = "leadflow")]
#[command(about = "Lead distribution and claim coordination engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (TOML or JSON); otherwise env vars, then probed paths
    #[arg(long, global = true, env = "LEADFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// JSON file listing distribution targets
    #[arg(long, global = true, env = "LEADFLOW_TARGETS")]
    pub targets: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Try to capture an escalated lead for an agent
    ClaimLead {
        #[arg(long)]
        lead: String,
        #[arg(long)]
        agent: String,
    },
    /// Split unit totals across distribution targets
    PreviewDistribution {
        #[arg(long)]
        strategy: StrategyType,
        /// Target id, repeatable; order is the tie-break order
        #[arg(long = "target", required = true)]
        target_ids: Vec<String>,
        #[command(flatten)]
        totals: TotalsArgs,
        /// Buckets to distribute, comma separated (default: hot,warm,cold)
        #[arg(long, value_delimiter = ',')]
        scope: Option<Vec<UnitBucket>>,
        #[arg(long)]
        max_per_person: Option<u32>,
    },
    /// Preview a bulk redistribution or archive of an agent's wallet
    PreviewRedistribution {
        #[arg(long)]
        agent: String,
        #[arg(long, default_value = "redistribute")]
        action: RedistributionAction,
        #[arg(long, default_value = "round_robin")]
        strategy: StrategyType,
        #[arg(long = "target")]
        target_ids: Vec<String>,
        /// Temperatures to include, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        include: Option<Vec<LeadTemperature>>,
        #[arg(long)]
        max_per_person: Option<u32>,
    },
    /// Hot/warm/cold counts for an agent's wallet
    ShowWallet {
        #[arg(long)]
        agent: String,
    },
    /// Replace the staleness thresholds (days)
    SetThresholds {
        #[arg(long)]
        low: u32,
        #[arg(long)]
        mid: u32,
    },
    ShowThresholds,
    /// Staleness bucket of one lead
    ClassifyLead {
        #[arg(long)]
        lead: String,
    },
    /// SLA status of a ticket from its raw creation timestamp
    ClassifyTicket {
        /// RFC 3339; unparseable values count as overdue
        #[arg(long)]
        created_at: String,
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_TICKET_SLA_HOURS))]
        sla_hours: i64,
    },
    /// Insert or refresh leads from a JSON array
    ImportLeads { file: PathBuf },
    /// Arm escalation timers for the pending pool
    RunScheduler {
        /// Reconcile once, wait for due escalations, then exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct TotalsArgs {
    #[arg(long, default_value_t = 0)]
    pub hot: u64,
    #[arg(long, default_value_t = 0)]
    pub warm: u64,
    #[arg(long, default_value_t = 0)]
    pub cold: u64,
    #[arg(long, default_value_t = 0)]
    pub properties: u64,
}

impl From<TotalsArgs> for AllocationTotals {
    fn from(args: TotalsArgs) -> Self {
        Self {
            leads_hot: args.hot,
            leads_warm: args.warm,
            leads_cold: args.cold,
            properties: args.properties,
        }
    }
}

/// Scope from an explicit bucket list; `None` keeps the default scope.
pub fn scope_from(buckets: Option<&[UnitBucket]>) -> DistributionScope {
    let Some(buckets) = buckets else {
        return DistributionScope::default();
    };
    DistributionScope {
        hot: buckets.contains(&UnitBucket::Hot),
        warm: buckets.contains(&UnitBucket::Warm),
        cold: buckets.contains(&UnitBucket::Cold),
        properties: buckets.contains(&UnitBucket::Properties),
    }
}

pub fn filters_from(include: Option<&[LeadTemperature]>) -> RedistributionFilters {
    let Some(include) = include else {
        return RedistributionFilters::default();
    };
    RedistributionFilters {
        hot: include.contains(&LeadTemperature::Hot),
        warm: include.contains(&LeadTemperature::Warm),
        cold: include.contains(&LeadTemperature::Cold),
    }
}
