#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use ledger_core::{
    CompletionEvent, CostBreakdown, DailyIncrement, DailyKey, RollupTotals, SessionIncrement,
    SessionRollup, TokenUsage,
};
use ledger_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

/// Event with 10 input, 5 output tokens and a cost of 0.01.
pub fn make_event(id: &str, ts: &str, session_id: &str, model: &str) -> CompletionEvent {
    CompletionEvent {
        message_id: id.to_string(),
        timestamp: sortable_millis(ts),
        timestamp_iso: ts.to_string(),
        agent: "main".to_string(),
        session_id: session_id.to_string(),
        model: model.to_string(),
        provider: "anthropic".to_string(),
        role: "assistant".to_string(),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
            cache_read: 0,
            cache_write: 0,
            total_tokens: 15,
        },
        cost: CostBreakdown {
            cost_input: 0.006,
            cost_output: 0.004,
            cost_cache_read: 0.0,
            cost_cache_write: 0.0,
            cost_total: 0.01,
        },
    }
}

pub fn with_cache(mut event: CompletionEvent, read: u64, write: u64) -> CompletionEvent {
    event.usage.cache_read = read;
    event.usage.cache_write = write;
    event
}

pub fn with_cost(mut event: CompletionEvent, cost: f64) -> CompletionEvent {
    event.cost.cost_total = cost;
    event
}

// Digits of a fixed-width ISO string order the same way as the string.
fn sortable_millis(ts: &str) -> i64 {
    ts.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or_default()
}

/// Writes `events` as one batch the way the ingestion pipeline does and
/// returns how many were accepted.
pub fn write_batch(db: &mut Db, events: &[CompletionEvent]) -> usize {
    let batch = db.begin_batch().expect("begin batch");
    let accepted = batch.insert_completions(events).expect("insert completions");
    let (daily, sessions) = increments(&accepted);
    batch.merge_daily_rollups(&daily).expect("merge daily");
    batch.merge_session_rollups(&sessions).expect("merge sessions");
    batch.commit().expect("commit");
    accepted.len()
}

fn increments(events: &[&CompletionEvent]) -> (Vec<DailyIncrement>, Vec<SessionIncrement>) {
    let mut daily: BTreeMap<DailyKey, DailyIncrement> = BTreeMap::new();
    let mut sessions: BTreeMap<String, SessionRollup> = BTreeMap::new();
    for event in events {
        let key = DailyKey {
            date: event.date().to_string(),
            agent: event.agent.clone(),
            model: event.model.clone(),
        };
        let entry = daily.entry(key.clone()).or_insert_with(|| DailyIncrement {
            key,
            provider: event.provider.clone(),
            totals: RollupTotals::default(),
            sessions: Default::default(),
        });
        entry.totals.record(event);
        entry.sessions.insert(event.session_id.clone());

        let session = sessions
            .entry(event.session_id.clone())
            .or_insert_with(|| SessionRollup {
                session_id: event.session_id.clone(),
                agent: event.agent.clone(),
                models: Default::default(),
                providers: Default::default(),
                totals: RollupTotals::default(),
                first_timestamp: event.timestamp_iso.clone(),
                last_timestamp: event.timestamp_iso.clone(),
            });
        session.totals.record(event);
        session.models.insert(event.model.clone());
        session.providers.insert(event.provider.clone());
        if event.timestamp_iso < session.first_timestamp {
            session.first_timestamp = event.timestamp_iso.clone();
        }
        if event.timestamp_iso > session.last_timestamp {
            session.last_timestamp = event.timestamp_iso.clone();
        }
    }
    (daily.into_values().collect(), sessions.into_values().collect())
}
