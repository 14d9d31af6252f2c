use ledger_db::ClearSummary;

use crate::error::{AppError, Result};
use crate::services::{SharedCache, SharedConfig, WriteLock, open_db};

pub const DEFAULT_CLEAR_BATCH_SIZE: usize = 500;

#[derive(Clone)]
pub struct AdminService {
    config: SharedConfig,
    cache: SharedCache,
    write_lock: WriteLock,
}

impl AdminService {
    pub(super) fn new(config: SharedConfig, cache: SharedCache, write_lock: WriteLock) -> Self {
        Self {
            config,
            cache,
            write_lock,
        }
    }

    /// Empties the event store, both rollup stores and the cursor. Waits for
    /// a running ingestion to finish first.
    pub fn clear_all(&self, batch_size: usize) -> Result<ClearSummary> {
        if batch_size == 0 {
            return Err(AppError::InvalidInput(
                "batch size must be positive".to_string(),
            ));
        }
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Message("write lock poisoned".to_string()))?;
        let db = open_db(&self.config)?;
        let summary = db.clear_all(batch_size)?;
        self.cache.clear();
        tracing::warn!(removed = %summary.to_json(), "cleared ledger tables");
        Ok(summary)
    }
}
