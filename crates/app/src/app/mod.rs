use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::error::{AppError, Result};
use crate::services::AppServices;
use ledger_db::Db;

/// Paths and tuning knobs needed to run the ledger backend.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Usage ledger (NDJSON) to ingest from.
    pub log_path: PathBuf,
    pub batch_size: usize,
    pub cache_ttl: Duration,
}

impl AppConfig {
    pub fn new(db_path: PathBuf, log_path: PathBuf) -> Self {
        Self {
            db_path,
            log_path,
            batch_size: ingest::DEFAULT_BATCH_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Application state shared by front ends (HTTP server, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    /// Prepares the database and, when `run_ingest` is set and the log exists,
    /// catches up with it.
    pub fn initialize(&self, run_ingest: bool) -> Result<()> {
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        if !run_ingest {
            return Ok(());
        }
        if !self.config.log_path.exists() {
            tracing::warn!(
                path = %self.config.log_path.display(),
                "usage ledger not found, skipping initial ingestion"
            );
            return Ok(());
        }
        self.refresh_data()
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    pub fn refresh_data(&self) -> Result<()> {
        self.services.ingest.run().map(|_| ())
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
