use std::collections::BTreeSet;

use ledger_core::{DailyKey, DailyRollup, DailyRollupState, DateRange, SessionRollup};
use rusqlite::{Connection, OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{DAILY_COLUMNS, SESSION_COLUMNS, row_to_daily_rollup, row_to_session_rollup};

impl Db {
    pub fn daily_rollup(&self, date: &str, agent: &str, model: &str) -> Result<Option<DailyRollup>> {
        let key = DailyKey {
            date: date.to_string(),
            agent: agent.to_string(),
            model: model.to_string(),
        };
        Ok(load_daily_state(&self.conn, &key)?.map(|state| state.rollup))
    }

    pub fn session_rollup(&self, session_id: &str) -> Result<Option<SessionRollup>> {
        load_session_rollup(&self.conn, session_id)
    }

    /// Daily rollups whose date falls in `range`, ordered by date, agent, model.
    pub fn load_daily_rollups(&self, range: &DateRange) -> Result<Vec<DailyRollup>> {
        if range.is_inverted() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT {DAILY_COLUMNS}
            FROM daily_rollup
            WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
            ORDER BY date ASC, agent ASC, model ASC
            "#
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(
            params![range.start_date, range.end_date],
            row_to_daily_rollup,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

pub(crate) fn load_daily_state(
    conn: &Connection,
    key: &DailyKey,
) -> Result<Option<DailyRollupState>> {
    let sql = format!(
        "SELECT {DAILY_COLUMNS} FROM daily_rollup WHERE date = ?1 AND agent = ?2 AND model = ?3"
    );
    let rollup = conn
        .query_row(
            &sql,
            params![key.date, key.agent, key.model],
            row_to_daily_rollup,
        )
        .optional()?;
    let Some(rollup) = rollup else {
        return Ok(None);
    };
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT session_id
        FROM daily_rollup_session
        WHERE date = ?1 AND agent = ?2 AND model = ?3
        "#,
    )?;
    let sessions = stmt
        .query_map(params![key.date, key.agent, key.model], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<std::result::Result<BTreeSet<_>, _>>()?;
    Ok(Some(DailyRollupState { rollup, sessions }))
}

pub(crate) fn load_session_rollup(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<SessionRollup>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM session_rollup WHERE session_id = ?1");
    Ok(conn
        .query_row(&sql, params![session_id], row_to_session_rollup)
        .optional()?)
}
