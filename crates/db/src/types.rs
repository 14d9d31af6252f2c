use serde_json::{Map, Value};

/// Tables that the administrative clear can empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerTable {
    Completions,
    DailyRollups,
    DailyRollupSessions,
    SessionRollups,
    IngestCursor,
}

impl LedgerTable {
    pub const ALL: [LedgerTable; 5] = [
        LedgerTable::Completions,
        LedgerTable::DailyRollups,
        LedgerTable::DailyRollupSessions,
        LedgerTable::SessionRollups,
        LedgerTable::IngestCursor,
    ];

    pub(crate) fn sql_name(self) -> &'static str {
        match self {
            Self::Completions => "completion",
            Self::DailyRollups => "daily_rollup",
            Self::DailyRollupSessions => "daily_rollup_session",
            Self::SessionRollups => "session_rollup",
            Self::IngestCursor => "ingest_cursor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completions => "completions",
            Self::DailyRollups => "dailyStats",
            Self::DailyRollupSessions => "dailyStatSessions",
            Self::SessionRollups => "sessions",
            Self::IngestCursor => "ingestionState",
        }
    }
}

/// Result of one bounded delete; `done` once fewer than the batch size went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearBatch {
    pub deleted: usize,
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub removed: Vec<(LedgerTable, usize)>,
}

impl ClearSummary {
    pub fn removed_from(&self, table: LedgerTable) -> usize {
        self.removed
            .iter()
            .find(|(candidate, _)| *candidate == table)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (table, count) in &self.removed {
            map.insert(table.label().to_string(), Value::from(*count as u64));
        }
        Value::Object(map)
    }
}
