use ledger_core::CompletionEvent;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::batch::insert_completions;
use crate::error::Result;

impl Db {
    /// Stores events outside of an ingestion batch. Returns how many were new.
    pub fn insert_completions(&mut self, events: &[CompletionEvent]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let accepted = insert_completions(&tx, events)?.len();
        tx.commit()?;
        Ok(accepted)
    }

    pub fn completion_exists(&self, message_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM completion WHERE message_id = ?1",
                params![message_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn count_completions(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM completion", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
