//! Application context - dependency injection container

use std::path::{Path, PathBuf};
use std::sync::Arc;

use leadflow_core::{
    ClaimCoordinator, Clock, LeadStore, Notifier, RedistributionService, StalenessService,
    SystemClock, TargetDirectory, ThresholdStore,
};
use leadflow_domain::{Config, LeadflowError, Result};
use leadflow_infra::config::{load, load_from_file, probe_config_paths};
use leadflow_infra::{
    DbManager, EscalationScheduler, EscalationSchedulerConfig, SqliteLeadStore,
    SqliteThresholdStore, StaticTargetDirectory, TracingNotifier,
};
use tracing::{debug, info};

/// Holds the stores and services one CLI invocation works with
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub leads: Arc<SqliteLeadStore>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub staleness: Arc<StalenessService>,
    pub claims: ClaimCoordinator,
    targets_path: Option<PathBuf>,
}

impl AppContext {
    /// Open the database, run migrations and wire the services.
    pub fn new(config: Config, targets_path: Option<PathBuf>) -> Result<Self> {
        Self::with_clock(config, targets_path, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Config,
        targets_path: Option<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let leads = Arc::new(SqliteLeadStore::new(Arc::clone(&db)));
        let lead_port: Arc<dyn LeadStore> = leads.clone();
        let thresholds: Arc<dyn ThresholdStore> =
            Arc::new(SqliteThresholdStore::new(Arc::clone(&db), config.sla.thresholds()?));
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        let staleness =
            Arc::new(StalenessService::new(thresholds, Arc::clone(&lead_port), Arc::clone(&clock)));
        let claims = ClaimCoordinator::new(
            lead_port,
            Arc::clone(&notifier),
            Arc::clone(&clock),
            config.claims.store_timeout(),
        );

        info!(db = %db.path().display(), "application context ready");

        Ok(Self { config, db, leads, clock, notifier, staleness, claims, targets_path })
    }

    /// Target directory from the `--targets` file.
    ///
    /// # Errors
    /// `Config` when no targets file was given or it cannot be parsed.
    pub fn targets(&self) -> Result<Arc<StaticTargetDirectory>> {
        let path = self.targets_path.as_deref().ok_or_else(|| {
            LeadflowError::Config("no targets file given (--targets or LEADFLOW_TARGETS)".into())
        })?;
        StaticTargetDirectory::from_file(path).map(Arc::new)
    }

    pub fn redistribution(&self) -> Result<RedistributionService> {
        let targets: Arc<dyn TargetDirectory> = self.targets()?;
        Ok(RedistributionService::new(Arc::clone(&self.staleness), targets))
    }

    pub fn scheduler(&self) -> EscalationScheduler {
        EscalationScheduler::new(
            self.leads.clone(),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
            EscalationSchedulerConfig::from_queue(&self.config.queue),
        )
    }
}

/// Resolve configuration: explicit file, then env/probed files, then
/// defaults. `db_override` replaces the database path.
pub fn resolve_config(path: Option<&Path>, db_override: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(Some(path.to_path_buf()))?,
        None if std::env::var_os("LEADFLOW_DB_PATH").is_some()
            || probe_config_paths().is_some() =>
        {
            load()?
        }
        None => {
            debug!("no configuration found, using defaults");
            Config::default()
        }
    };

    if let Some(db) = db_override {
        config.database.path = db.to_string_lossy().into_owned();
    }
    config.validate()?;
    Ok(config)
}
