use ledger_core::{
    CompletionEvent, DailyIncrement, SessionIncrement, merge_daily, merge_session,
};
use rusqlite::{Transaction, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::encode_set;
use crate::rollups::{load_daily_state, load_session_rollup};

/// Writes one ingestion batch inside a single transaction. Dropping the
/// writer without calling [`BatchWriter::commit`] rolls everything back.
pub struct BatchWriter<'conn> {
    tx: Transaction<'conn>,
}

impl Db {
    pub fn begin_batch(&mut self) -> Result<BatchWriter<'_>> {
        Ok(BatchWriter {
            tx: self.conn.transaction()?,
        })
    }
}

impl<'conn> BatchWriter<'conn> {
    /// Inserts events whose `message_id` is not stored yet and returns the
    /// accepted ones in input order. Duplicates, including repeats within the
    /// slice, are skipped.
    pub fn insert_completions<'e>(
        &self,
        events: &'e [CompletionEvent],
    ) -> Result<Vec<&'e CompletionEvent>> {
        insert_completions(&self.tx, events)
    }

    pub fn merge_daily_rollups(&self, increments: &[DailyIncrement]) -> Result<usize> {
        let mut upsert = self.tx.prepare_cached(
            r#"
            INSERT INTO daily_rollup (
              date, agent, model, provider, total_cost, total_tokens, total_input_tokens,
              total_output_tokens, total_cache_read, total_cache_write, message_count, session_count
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(date, agent, model) DO UPDATE SET
              provider = excluded.provider,
              total_cost = excluded.total_cost,
              total_tokens = excluded.total_tokens,
              total_input_tokens = excluded.total_input_tokens,
              total_output_tokens = excluded.total_output_tokens,
              total_cache_read = excluded.total_cache_read,
              total_cache_write = excluded.total_cache_write,
              message_count = excluded.message_count,
              session_count = excluded.session_count
            "#,
        )?;
        let mut member = self.tx.prepare_cached(
            r#"
            INSERT OR IGNORE INTO daily_rollup_session (date, agent, model, session_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )?;
        let mut touched = 0usize;
        for delta in increments {
            let existing = load_daily_state(&self.tx, &delta.key)?;
            let merged = merge_daily(existing, delta);
            let rollup = &merged.rollup;
            let totals = &rollup.totals;
            upsert.execute(params![
                rollup.date,
                rollup.agent,
                rollup.model,
                rollup.provider,
                totals.total_cost,
                totals.total_tokens as i64,
                totals.total_input_tokens as i64,
                totals.total_output_tokens as i64,
                totals.total_cache_read as i64,
                totals.total_cache_write as i64,
                totals.message_count as i64,
                rollup.session_count as i64,
            ])?;
            for session_id in &delta.sessions {
                member.execute(params![
                    delta.key.date,
                    delta.key.agent,
                    delta.key.model,
                    session_id
                ])?;
            }
            touched += 1;
        }
        Ok(touched)
    }

    pub fn merge_session_rollups(&self, increments: &[SessionIncrement]) -> Result<usize> {
        let mut upsert = self.tx.prepare_cached(
            r#"
            INSERT INTO session_rollup (
              session_id, agent, models, providers, total_cost, total_tokens, total_input_tokens,
              total_output_tokens, total_cache_read, total_cache_write, message_count, first_ts, last_ts
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(session_id) DO UPDATE SET
              models = excluded.models,
              providers = excluded.providers,
              total_cost = excluded.total_cost,
              total_tokens = excluded.total_tokens,
              total_input_tokens = excluded.total_input_tokens,
              total_output_tokens = excluded.total_output_tokens,
              total_cache_read = excluded.total_cache_read,
              total_cache_write = excluded.total_cache_write,
              message_count = excluded.message_count,
              first_ts = excluded.first_ts,
              last_ts = excluded.last_ts
            "#,
        )?;
        let mut touched = 0usize;
        for delta in increments {
            let existing = load_session_rollup(&self.tx, &delta.session_id)?;
            let merged = merge_session(existing, delta);
            let totals = &merged.totals;
            upsert.execute(params![
                merged.session_id,
                merged.agent,
                encode_set(&merged.models)?,
                encode_set(&merged.providers)?,
                totals.total_cost,
                totals.total_tokens as i64,
                totals.total_input_tokens as i64,
                totals.total_output_tokens as i64,
                totals.total_cache_read as i64,
                totals.total_cache_write as i64,
                totals.message_count as i64,
                merged.first_timestamp,
                merged.last_timestamp,
            ])?;
            touched += 1;
        }
        Ok(touched)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

pub(crate) fn insert_completions<'e>(
    conn: &rusqlite::Connection,
    events: &'e [CompletionEvent],
) -> Result<Vec<&'e CompletionEvent>> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT OR IGNORE INTO completion (
          message_id, ts, ts_iso, agent, session_id, model, provider, role,
          input_tokens, output_tokens, cache_read, cache_write, total_tokens,
          cost_input, cost_output, cost_cache_read, cost_cache_write, cost_total
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        "#,
    )?;
    let mut accepted = Vec::with_capacity(events.len());
    for event in events {
        let inserted = stmt.execute(params![
            event.message_id,
            event.timestamp,
            event.timestamp_iso,
            event.agent,
            event.session_id,
            event.model,
            event.provider,
            event.role,
            event.usage.input_tokens as i64,
            event.usage.output_tokens as i64,
            event.usage.cache_read as i64,
            event.usage.cache_write as i64,
            event.usage.total_tokens as i64,
            event.cost.cost_input,
            event.cost.cost_output,
            event.cost.cost_cache_read,
            event.cost.cost_cache_write,
            event.cost.cost_total,
        ])?;
        if inserted > 0 {
            accepted.push(event);
        }
    }
    Ok(accepted)
}
