//! SQLite-backed lead store
//!
//! The capture compare-and-set is one conditional `UPDATE`, so SQLite's write
//! lock decides every race between concurrent claims. The winning `UPDATE`
//! and its `lead_history` row commit in the same transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::LeadStore;
use leadflow_domain::{
    HistoryAction, Lead, LeadHistoryEntry, LeadPatch, LeadStage, LeadflowError, PoolFilter,
    Result as DomainResult,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;

use super::manager::{map_sql_error, DbManager};

const LEAD_COLUMNS: &str = "id, pool_id, created_at, stage, captured_by, last_contact_at";

/// SQLite implementation of [`LeadStore`]
pub struct SqliteLeadStore {
    db: Arc<DbManager>,
}

impl SqliteLeadStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert `lead`, or refresh the pool and contact time of an existing
    /// one. Stage and owner of an existing lead are left untouched.
    ///
    /// Returns `true` when the lead was new.
    pub async fn upsert(&self, lead: &Lead) -> DomainResult<bool> {
        let lead = lead.clone();
        self.db
            .with_connection(move |conn| {
                let existed = lead_exists(conn, &lead.id)?;
                conn.execute(
                    "INSERT INTO leads (id, pool_id, created_at, stage, captured_by, last_contact_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        pool_id = excluded.pool_id,
                        last_contact_at = COALESCE(excluded.last_contact_at, leads.last_contact_at)",
                    params![
                        lead.id,
                        lead.pool_id,
                        lead.created_at.timestamp_millis(),
                        lead.stage.to_string(),
                        lead.captured_by,
                        lead.last_contact_at.map(|at| at.timestamp_millis()),
                    ],
                )
                .map_err(map_sql_error)?;
                Ok(!existed)
            })
            .await
    }

    /// Remove a lead from the pool altogether.
    pub async fn remove(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let removed =
                    conn.execute("DELETE FROM leads WHERE id = ?1", params![id]).map_err(map_sql_error)?;
                Ok(removed > 0)
            })
            .await
    }

    /// Audit entries for one lead, oldest first.
    pub async fn history_for(&self, lead_id: &str) -> DomainResult<Vec<LeadHistoryEntry>> {
        let lead_id = lead_id.to_string();
        self.db
            .with_connection(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT lead_id, agent_id, action, recorded_at
                         FROM lead_history WHERE lead_id = ?1 ORDER BY id",
                    )
                    .map_err(map_sql_error)?;
                let rows = stmt.query_map(params![lead_id], map_history_row).map_err(map_sql_error)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
            })
            .await
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn list_pending(&self, filter: &PoolFilter) -> DomainResult<Vec<Lead>> {
        let pool_id = filter.pool_id.clone();
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {LEAD_COLUMNS} FROM leads
                     WHERE stage = 'pending' AND (?1 IS NULL OR pool_id = ?1)
                     ORDER BY id"
                );
                let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
                let rows = stmt.query_map(params![pool_id], map_lead_row).map_err(map_sql_error)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
            })
            .await
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Lead> {
        let id = id.to_string();
        self.db.with_connection(move |conn| find_lead(conn, &id)).await
    }

    async fn compare_and_set_capture(
        &self,
        id: &str,
        new_owner: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let entry = LeadHistoryEntry::captured(id, new_owner, at);
        self.db
            .with_connection(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(map_sql_error)?;
                let changed = tx
                    .execute(
                        "UPDATE leads SET captured_by = ?2, stage = 'claimed'
                         WHERE id = ?1 AND captured_by IS NULL AND stage = 'escalated'",
                        params![entry.lead_id, entry.agent_id],
                    )
                    .map_err(map_sql_error)?;
                let won = changed == 1;
                if won {
                    insert_history(&tx, &entry)?;
                }
                tx.commit().map_err(map_sql_error)?;
                debug!(
                    lead_id = %entry.lead_id,
                    agent_id = %entry.agent_id,
                    won,
                    "capture compare-and-set"
                );
                Ok(won)
            })
            .await
    }

    async fn mark_escalated(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let changed = conn
                    .execute(
                        "UPDATE leads SET stage = 'escalated'
                         WHERE id = ?1 AND stage = 'pending' AND captured_by IS NULL",
                        params![id],
                    )
                    .map_err(map_sql_error)?;
                if changed == 1 {
                    return Ok(true);
                }
                if lead_exists(conn, &id)? {
                    Ok(false)
                } else {
                    Err(LeadflowError::NotFound(format!("lead {id}")))
                }
            })
            .await
    }

    async fn update(&self, id: &str, patch: &LeadPatch) -> DomainResult<Lead> {
        let id = id.to_string();
        let patch = patch.clone();
        self.db
            .with_connection(move |conn| {
                if !patch.is_empty() {
                    let changed = conn
                        .execute(
                            "UPDATE leads SET
                                pool_id = COALESCE(?2, pool_id),
                                last_contact_at = COALESCE(?3, last_contact_at)
                             WHERE id = ?1",
                            params![
                                id,
                                patch.pool_id,
                                patch.last_contact_at.map(|at| at.timestamp_millis())
                            ],
                        )
                        .map_err(map_sql_error)?;
                    if changed == 0 {
                        return Err(LeadflowError::NotFound(format!("lead {id}")));
                    }
                }
                find_lead(conn, &id)
            })
            .await
    }

    async fn append_history(&self, entry: &LeadHistoryEntry) -> DomainResult<()> {
        let entry = entry.clone();
        self.db
            .with_connection(move |conn| insert_history(conn, &entry))
            .await
    }

    async fn list_by_owner(&self, agent_id: &str) -> DomainResult<Vec<Lead>> {
        let agent_id = agent_id.to_string();
        self.db
            .with_connection(move |conn| {
                let sql =
                    format!("SELECT {LEAD_COLUMNS} FROM leads WHERE captured_by = ?1 ORDER BY id");
                let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
                let rows = stmt.query_map(params![agent_id], map_lead_row).map_err(map_sql_error)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
            })
            .await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn find_lead(conn: &Connection, id: &str) -> DomainResult<Lead> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1");
    conn.query_row(&sql, params![id], map_lead_row)
        .optional()
        .map_err(map_sql_error)?
        .ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))
}

fn insert_history(conn: &Connection, entry: &LeadHistoryEntry) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO lead_history (lead_id, agent_id, action, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.lead_id,
            entry.agent_id,
            entry.action.to_string(),
            entry.recorded_at.timestamp_millis()
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn lead_exists(conn: &Connection, id: &str) -> DomainResult<bool> {
    conn.query_row("SELECT 1 FROM leads WHERE id = ?1", params![id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(map_sql_error)
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let stage: String = row.get(3)?;
    let last_contact: Option<i64> = row.get(5)?;
    Ok(Lead {
        id: row.get(0)?,
        pool_id: row.get(1)?,
        created_at: from_millis(2, row.get(2)?)?,
        stage: stage
            .parse::<LeadStage>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?,
        captured_by: row.get(4)?,
        last_contact_at: last_contact.map(|ms| from_millis(5, ms)).transpose()?,
    })
}

fn map_history_row(row: &Row<'_>) -> rusqlite::Result<LeadHistoryEntry> {
    let action: String = row.get(2)?;
    Ok(LeadHistoryEntry {
        lead_id: row.get(0)?,
        agent_id: row.get(1)?,
        action: action
            .parse::<HistoryAction>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?,
        recorded_at: from_millis(3, row.get(3)?)?,
    })
}

fn from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

// =============================================================================
// Tests
// =============================================================================
