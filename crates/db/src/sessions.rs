use std::collections::{BTreeSet, HashMap};

use ledger_core::{CompletionEvent, DateRange, RollupTotals, SessionRollup, SessionSummary};
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::{
    COMPLETION_COLUMNS, SESSION_COLUMNS, row_to_completion, row_to_session_rollup,
};

pub const DEFAULT_SESSION_SCAN_LIMIT: usize = 1000;

impl Db {
    /// Most recently active sessions, newest `last_timestamp` first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM session_rollup
            ORDER BY last_ts DESC, session_id ASC
            LIMIT ?1
            "#
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![limit as i64], row_to_session_rollup)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(SessionSummary::from_rollup(&row?));
        }
        Ok(sessions)
    }

    /// Sessions whose last activity falls inside `range`. The end bound covers
    /// the whole end day.
    pub fn session_count(&self, range: &DateRange) -> Result<u64> {
        if range.is_inverted() {
            return Ok(0);
        }
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM session_rollup
            WHERE (?1 IS NULL OR last_ts >= ?1) AND (?2 IS NULL OR last_ts <= ?2)
            "#,
            params![range.start_date, range.end_of_day()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Session summaries derived from the newest `scan_limit` raw events
    /// instead of the session rollups. Sessions older than the scan window
    /// are missing and partially scanned ones are undercounted.
    pub fn recent_sessions_from_events(
        &self,
        limit: usize,
        scan_limit: usize,
    ) -> Result<Vec<SessionSummary>> {
        let sql = format!(
            r#"
            SELECT {COMPLETION_COLUMNS}
            FROM completion
            ORDER BY ts DESC, message_id ASC
            LIMIT ?1
            "#
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![scan_limit as i64], row_to_completion)?;
        let mut by_session: HashMap<String, SessionRollup> = HashMap::new();
        for row in rows {
            let event = row?;
            let rollup = by_session
                .entry(event.session_id.clone())
                .or_insert_with(|| empty_session(&event));
            rollup.totals.record(&event);
            rollup.models.insert(event.model.clone());
            rollup.providers.insert(event.provider.clone());
            if event.timestamp_iso < rollup.first_timestamp {
                rollup.first_timestamp = event.timestamp_iso.clone();
            }
            if event.timestamp_iso > rollup.last_timestamp {
                rollup.last_timestamp = event.timestamp_iso.clone();
            }
        }
        let mut sessions: Vec<SessionRollup> = by_session.into_values().collect();
        sessions.sort_by(|a, b| {
            b.last_timestamp
                .cmp(&a.last_timestamp)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(sessions
            .iter()
            .take(limit)
            .map(SessionSummary::from_rollup)
            .collect())
    }

    pub fn session_events(&self, session_id: &str) -> Result<Vec<CompletionEvent>> {
        let sql = format!(
            r#"
            SELECT {COMPLETION_COLUMNS}
            FROM completion
            WHERE session_id = ?1
            ORDER BY ts ASC, message_id ASC
            "#
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![session_id], row_to_completion)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn empty_session(event: &CompletionEvent) -> SessionRollup {
    SessionRollup {
        session_id: event.session_id.clone(),
        agent: event.agent.clone(),
        models: BTreeSet::new(),
        providers: BTreeSet::new(),
        totals: RollupTotals::default(),
        first_timestamp: event.timestamp_iso.clone(),
        last_timestamp: event.timestamp_iso.clone(),
    }
}
