use ledger_core::IngestCursor;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn get_ingest_cursor(&self) -> Result<Option<IngestCursor>> {
        let cursor = self
            .conn
            .query_row(
                r#"
                SELECT last_processed_line, last_processed_ts, total_ingested, updated_at
                FROM ingest_cursor
                WHERE id = 1
                "#,
                [],
                |row| {
                    Ok(IngestCursor {
                        last_processed_line: row.get::<_, i64>(0)? as u64,
                        last_processed_timestamp: row.get(1)?,
                        total_ingested: row.get::<_, i64>(2)? as u64,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(cursor)
    }

    pub fn save_ingest_cursor(&self, cursor: &IngestCursor) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO ingest_cursor (id, last_processed_line, last_processed_ts, total_ingested, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
              last_processed_line = excluded.last_processed_line,
              last_processed_ts = excluded.last_processed_ts,
              total_ingested = excluded.total_ingested,
              updated_at = excluded.updated_at
            "#,
            params![
                cursor.last_processed_line as i64,
                cursor.last_processed_timestamp,
                cursor.total_ingested as i64,
                cursor.updated_at,
            ],
        )?;
        Ok(())
    }
}
