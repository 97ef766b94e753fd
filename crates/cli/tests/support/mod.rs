//! Shared helpers for `leadflow-cli` integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use leadflow_cli::AppContext;
use leadflow_core::FixedClock;
use leadflow_domain::{Config, Lead, LeadStage};
use tempfile::TempDir;

/// Fixed reference instant used across tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

/// A context over a fresh database in its own temp dir.
pub struct TestEnv {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let targets = dir.path().join("targets.json");
        std::fs::write(
            &targets,
            r#"[
                { "id": "bo", "kind": "user", "name": "Bo", "lead_quota": 2 },
                { "id": "cy", "kind": "user", "name": "Cy", "lead_quota": 1 }
            ]"#,
        )
        .unwrap();

        let ctx = Self::context(&dir, Some(targets));
        Self { ctx, dir }
    }

    /// Same database, no targets file.
    pub fn without_targets() -> Self {
        let dir = TempDir::new().unwrap();
        let ctx = Self::context(&dir, None);
        Self { ctx, dir }
    }

    fn context(dir: &TempDir, targets: Option<PathBuf>) -> AppContext {
        let mut config = Config::default();
        config.database.path = dir.path().join("leadflow.db").to_string_lossy().into_owned();
        AppContext::with_clock(config, targets, Arc::new(FixedClock::new(base_time()))).unwrap()
    }

    /// Write `leads` as a JSON import file and return its path.
    pub fn lead_file(&self, leads: &[Lead]) -> PathBuf {
        let path = self.dir.path().join("leads.json");
        std::fs::write(&path, serde_json::to_string(leads).unwrap()).unwrap();
        path
    }
}

/// Pool and wallet fixture:
/// - `overdue`: pending, uncaptured, past its escalation deadline
/// - `open`: escalated and claimable
/// - `w-hot`, `w-warm`, `w-cold`: owned by `ana` with 1, 10 and no days
///   since last contact
pub fn fixture_leads() -> Vec<Lead> {
    let now = base_time();
    let overdue = Lead::new("overdue", "inbound", now - Duration::hours(2));

    let mut open = Lead::new("open", "inbound", now - Duration::days(1));
    open.stage = LeadStage::Escalated;

    let owned = |id: &str, contact: Option<i64>| {
        let mut lead = Lead::new(id, "inbound", now - Duration::days(40));
        lead.stage = LeadStage::Claimed;
        lead.captured_by = Some("ana".to_string());
        lead.last_contact_at = contact.map(|days| now - Duration::days(days));
        lead
    };

    vec![overdue, open, owned("w-hot", Some(1)), owned("w-warm", Some(10)), owned("w-cold", None)]
}
