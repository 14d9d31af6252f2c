use std::collections::BTreeSet;

use ledger_core::{
    CompletionEvent, CostBreakdown, DailyRollup, RollupTotals, SessionRollup, TokenUsage,
};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::error::Result;

pub(crate) const COMPLETION_COLUMNS: &str = r#"
    message_id, ts, ts_iso, agent, session_id, model, provider, role,
    input_tokens, output_tokens, cache_read, cache_write, total_tokens,
    cost_input, cost_output, cost_cache_read, cost_cache_write, cost_total
"#;

pub(crate) const DAILY_COLUMNS: &str = r#"
    date, agent, model, provider, total_cost, total_tokens, total_input_tokens,
    total_output_tokens, total_cache_read, total_cache_write, message_count, session_count
"#;

pub(crate) const SESSION_COLUMNS: &str = r#"
    session_id, agent, models, providers, total_cost, total_tokens, total_input_tokens,
    total_output_tokens, total_cache_read, total_cache_write, message_count, first_ts, last_ts
"#;

pub(crate) fn row_to_completion(
    row: &Row<'_>,
) -> std::result::Result<CompletionEvent, rusqlite::Error> {
    Ok(CompletionEvent {
        message_id: row.get(0)?,
        timestamp: row.get(1)?,
        timestamp_iso: row.get(2)?,
        agent: row.get(3)?,
        session_id: row.get(4)?,
        model: row.get(5)?,
        provider: row.get(6)?,
        role: row.get(7)?,
        usage: TokenUsage {
            input_tokens: row.get::<_, i64>(8)? as u64,
            output_tokens: row.get::<_, i64>(9)? as u64,
            cache_read: row.get::<_, i64>(10)? as u64,
            cache_write: row.get::<_, i64>(11)? as u64,
            total_tokens: row.get::<_, i64>(12)? as u64,
        },
        cost: CostBreakdown {
            cost_input: row.get(13)?,
            cost_output: row.get(14)?,
            cost_cache_read: row.get(15)?,
            cost_cache_write: row.get(16)?,
            cost_total: row.get(17)?,
        },
    })
}

fn row_to_totals(
    row: &Row<'_>,
    offset: usize,
) -> std::result::Result<RollupTotals, rusqlite::Error> {
    Ok(RollupTotals {
        total_cost: row.get(offset)?,
        total_tokens: row.get::<_, i64>(offset + 1)? as u64,
        total_input_tokens: row.get::<_, i64>(offset + 2)? as u64,
        total_output_tokens: row.get::<_, i64>(offset + 3)? as u64,
        total_cache_read: row.get::<_, i64>(offset + 4)? as u64,
        total_cache_write: row.get::<_, i64>(offset + 5)? as u64,
        message_count: row.get::<_, i64>(offset + 6)? as u64,
    })
}

pub(crate) fn row_to_daily_rollup(
    row: &Row<'_>,
) -> std::result::Result<DailyRollup, rusqlite::Error> {
    Ok(DailyRollup {
        date: row.get(0)?,
        agent: row.get(1)?,
        model: row.get(2)?,
        provider: row.get(3)?,
        totals: row_to_totals(row, 4)?,
        session_count: row.get::<_, i64>(11)? as u64,
    })
}

pub(crate) fn row_to_session_rollup(
    row: &Row<'_>,
) -> std::result::Result<SessionRollup, rusqlite::Error> {
    Ok(SessionRollup {
        session_id: row.get(0)?,
        agent: row.get(1)?,
        models: set_column(row, 2)?,
        providers: set_column(row, 3)?,
        totals: row_to_totals(row, 4)?,
        first_timestamp: row.get(11)?,
        last_timestamp: row.get(12)?,
    })
}

fn set_column(
    row: &Row<'_>,
    index: usize,
) -> std::result::Result<BTreeSet<String>, rusqlite::Error> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

pub(crate) fn encode_set(values: &BTreeSet<String>) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}
