use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::types::{ClearBatch, ClearSummary, LedgerTable};

impl Db {
    /// Deletes at most `batch_size` rows from `table`.
    pub fn clear_table(&self, table: LedgerTable, batch_size: usize) -> Result<ClearBatch> {
        let name = table.sql_name();
        let sql = format!("DELETE FROM {name} WHERE rowid IN (SELECT rowid FROM {name} LIMIT ?1)");
        let deleted = self.conn.execute(&sql, params![batch_size as i64])?;
        Ok(ClearBatch {
            deleted,
            done: deleted < batch_size,
        })
    }

    /// Empties every ledger table in bounded batches.
    pub fn clear_all(&self, batch_size: usize) -> Result<ClearSummary> {
        let batch_size = batch_size.max(1);
        let mut summary = ClearSummary::default();
        for table in LedgerTable::ALL {
            let mut removed = 0usize;
            loop {
                let batch = self.clear_table(table, batch_size)?;
                removed += batch.deleted;
                if batch.done {
                    break;
                }
            }
            summary.removed.push((table, removed));
        }
        Ok(summary)
    }
}
