use serde::Serialize;
use std::io;

use ledger_core::IngestCursor;

pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Events written per transaction.
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Zero-based index of the first line this run looked at.
    pub start_line: u64,
    pub lines_read: usize,
    pub events_inserted: usize,
    pub duplicates_skipped: usize,
    pub batches: usize,
    /// Distinct `(date, agent, model)` buckets that received a delta.
    pub daily_keys_touched: usize,
    pub session_keys_touched: usize,
    /// Cursor after the run; `None` when nothing was ever ingested.
    pub cursor: Option<IngestCursor>,
}

/// Errors emitted by the ingest pipeline.
#[derive(Debug)]
pub enum IngestError {
    Io(io::Error),
    Db(ledger_db::DbError),
    /// `line` is 1-based and counts from the start of the log.
    MalformedRecord { line: u64, message: String },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Db(err) => write!(f, "db error: {}", err),
            Self::MalformedRecord { line, message } => {
                write!(f, "malformed record on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for IngestError {}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ledger_db::DbError> for IngestError {
    fn from(err: ledger_db::DbError) -> Self {
        Self::Db(err)
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
