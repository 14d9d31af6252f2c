mod admin;
mod ingestion;
mod stats;

use std::sync::{Arc, Mutex};

use crate::app::AppConfig;
use crate::cache::{MemoryCache, ResponseCache};
use crate::error::Result;
use ledger_db::Db;

pub use admin::{AdminService, DEFAULT_CLEAR_BATCH_SIZE};
pub use ingestion::IngestService;
pub use stats::StatsService;

type SharedConfig = Arc<AppConfig>;
type SharedCache = Arc<dyn ResponseCache>;
/// Held for the whole of an ingestion run or an admin clear.
type WriteLock = Arc<Mutex<()>>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub stats: StatsService,
    pub ingest: IngestService,
    pub admin: AdminService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(config: &AppConfig, cache: SharedCache) -> Self {
        let shared = Arc::new(config.clone());
        let write_lock: WriteLock = Arc::new(Mutex::new(()));
        Self {
            stats: StatsService::new(shared.clone(), cache.clone()),
            ingest: IngestService::new(shared.clone(), cache.clone(), write_lock.clone()),
            admin: AdminService::new(shared, cache, write_lock),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
