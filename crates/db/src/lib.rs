use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

mod admin;
mod analytics;
mod batch;
mod breakdowns;
mod completions;
mod cursor;
mod error;
mod helpers;
mod migrations;
mod rollups;
mod sessions;
mod types;

pub use batch::BatchWriter;
pub use error::{DbError, Result};
pub use sessions::DEFAULT_SESSION_SCAN_LIMIT;
pub use types::{ClearBatch, ClearSummary, LedgerTable};

/// Handle over the ledger database: event store, rollup store, ingest cursor
/// and the read queries built on them.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }
}
