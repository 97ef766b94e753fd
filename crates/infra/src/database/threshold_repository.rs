//! SQLite-backed SLA threshold store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use leadflow_core::ThresholdStore;
use leadflow_domain::{LeadflowError, Result as DomainResult, SlaThresholds};
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::manager::{map_sql_error, DbManager};

/// Single-row threshold table; `defaults` apply until the first write.
pub struct SqliteThresholdStore {
    db: Arc<DbManager>,
    defaults: SlaThresholds,
}

impl SqliteThresholdStore {
    pub fn new(db: Arc<DbManager>, defaults: SlaThresholds) -> Self {
        Self { db, defaults }
    }
}

#[async_trait]
impl ThresholdStore for SqliteThresholdStore {
    async fn get_thresholds(&self) -> DomainResult<SlaThresholds> {
        let defaults = self.defaults;
        self.db
            .with_connection(move |conn| {
                let stored = conn
                    .query_row(
                        "SELECT low_max, mid_max FROM sla_thresholds WHERE id = 1",
                        [],
                        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
                    )
                    .optional()
                    .map_err(map_sql_error)?;

                match stored {
                    Some((low, mid)) => SlaThresholds::new(low, mid).map_err(|e| {
                        LeadflowError::Database(format!("stored thresholds are invalid: {e}"))
                    }),
                    None => Ok(defaults),
                }
            })
            .await
    }

    async fn set_thresholds(&self, thresholds: SlaThresholds) -> DomainResult<()> {
        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO sla_thresholds (id, low_max, mid_max, updated_at)
                     VALUES (1, ?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                        low_max = excluded.low_max,
                        mid_max = excluded.mid_max,
                        updated_at = excluded.updated_at",
                    params![
                        thresholds.low_max(),
                        thresholds.mid_max(),
                        Utc::now().timestamp_millis()
                    ],
                )
                .map_err(map_sql_error)?;
                Ok(())
            })
            .await?;

        info!(low_max = thresholds.low_max(), mid_max = thresholds.mid_max(), "sla thresholds updated");
        Ok(())
    }
}
