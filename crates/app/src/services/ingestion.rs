use ingest::{IngestOptions, IngestStats};
use ledger_core::IngestCursor;

use crate::error::{AppError, Result};
use crate::services::{SharedCache, SharedConfig, WriteLock, open_db};

#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
    cache: SharedCache,
    write_lock: WriteLock,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig, cache: SharedCache, write_lock: WriteLock) -> Self {
        Self {
            config,
            cache,
            write_lock,
        }
    }

    /// Ingests new lines from the configured log. Runs are serialized with
    /// each other and with admin clears; a successful run drops every cached
    /// response.
    pub fn run(&self) -> Result<IngestStats> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Message("write lock poisoned".to_string()))?;
        let mut db = open_db(&self.config)?;
        let options = IngestOptions {
            batch_size: self.config.batch_size,
        };
        let stats = ingest::ingest_log_file(&mut db, &self.config.log_path, &options)
            .inspect_err(|err| tracing::error!("ingestion failed: {}", err))?;
        self.cache.clear();
        tracing::info!(
            inserted = stats.events_inserted,
            duplicates = stats.duplicates_skipped,
            "ingestion finished, response cache cleared"
        );
        Ok(stats)
    }

    pub fn state(&self) -> Result<Option<IngestCursor>> {
        let db = open_db(&self.config)?;
        Ok(db.get_ingest_cursor()?)
    }
}
