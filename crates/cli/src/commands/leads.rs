//! Lead import

use std::path::Path;

use leadflow_domain::{Lead, LeadflowError, Result as DomainResult};
use serde::Serialize;
use tracing::info;

use crate::context::AppContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
}

/// Upsert every lead in the JSON array at `path`.
///
/// Existing leads keep their stage and owner; only pool and last contact
/// are refreshed.
pub async fn import_leads(ctx: &AppContext, path: &Path) -> DomainResult<ImportReport> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            LeadflowError::NotFound(format!("lead file {}", path.display()))
        }
        _ => LeadflowError::Internal(format!("failed to read {}: {e}", path.display())),
    })?;
    let leads: Vec<Lead> = serde_json::from_str(&contents)
        .map_err(|e| LeadflowError::Validation(format!("invalid lead file: {e}")))?;

    let mut report = ImportReport::default();
    for lead in &leads {
        if ctx.leads.upsert(lead).await? {
            report.inserted += 1;
        } else {
            report.updated += 1;
        }
    }

    info!(inserted = report.inserted, updated = report.updated, "leads imported");
    Ok(report)
}
