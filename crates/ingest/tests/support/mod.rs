#![allow(dead_code)]

use std::path::PathBuf;

use ledger_db::Db;
use serde_json::json;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ledger.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub struct LedgerLine<'a> {
    pub id: &'a str,
    pub ts: &'a str,
    pub agent: &'a str,
    pub session: &'a str,
    pub model: &'a str,
    pub tokens: u64,
    pub cost: f64,
}

impl<'a> LedgerLine<'a> {
    pub fn new(id: &'a str, ts: &'a str, session: &'a str) -> Self {
        Self {
            id,
            ts,
            agent: "a",
            session,
            model: "m1",
            tokens: 10,
            cost: 0.5,
        }
    }

    pub fn model(mut self, model: &'a str) -> Self {
        self.model = model;
        self
    }

    pub fn usage(mut self, tokens: u64, cost: f64) -> Self {
        self.tokens = tokens;
        self.cost = cost;
        self
    }

    pub fn render(&self) -> String {
        json!({
            "messageId": self.id,
            "timestamp": self.ts,
            "agent": self.agent,
            "sessionId": self.session,
            "model": self.model,
            "provider": "anthropic",
            "role": "assistant",
            "inputTokens": self.tokens,
            "outputTokens": 0,
            "cacheRead": 0,
            "cacheWrite": 0,
            "totalTokens": self.tokens,
            "costInput": self.cost,
            "costOutput": 0.0,
            "costCacheRead": 0.0,
            "costCacheWrite": 0.0,
            "costTotal": self.cost,
        })
        .to_string()
    }
}

pub fn render_all(lines: &[LedgerLine<'_>]) -> Vec<String> {
    lines.iter().map(LedgerLine::render).collect()
}

/// Eight lines over two days, three sessions and two models. Costs are exact
/// binary fractions so sums do not depend on batching.
pub fn sample_ledger() -> Vec<String> {
    render_all(&[
        LedgerLine::new("e1", "2024-01-01T09:00:00.000Z", "s1").usage(10, 0.5),
        LedgerLine::new("e2", "2024-01-01T09:05:00.000Z", "s1").usage(20, 0.25),
        LedgerLine::new("e3", "2024-01-01T10:00:00.000Z", "s2").model("m2").usage(30, 0.125),
        LedgerLine::new("e4", "2024-01-01T10:30:00.000Z", "s2").usage(40, 0.0625),
        LedgerLine::new("e5", "2024-01-01T23:59:00.000Z", "s1").usage(50, 1.0),
        LedgerLine::new("e6", "2024-01-02T00:01:00.000Z", "s1").usage(60, 2.0),
        LedgerLine::new("e7", "2024-01-02T08:00:00.000Z", "s3").model("m2").usage(70, 0.75),
        LedgerLine::new("e8", "2024-01-02T08:10:00.000Z", "s3").model("m2").usage(80, 0.375),
    ])
}

/// All daily and session rollups, for comparing two databases.
pub fn snapshot(db: &Db) -> String {
    let daily = db
        .load_daily_rollups(&ledger_core::DateRange::all())
        .expect("daily rollups");
    let sessions = db.recent_sessions(1000).expect("sessions");
    let mut session_rollups = Vec::new();
    for session in &sessions {
        session_rollups.push(
            db.session_rollup(&session.session_id)
                .expect("session rollup")
                .expect("session row"),
        );
    }
    serde_json::to_string(&json!({ "daily": daily, "sessions": session_rollups }))
        .expect("snapshot json")
}
