use std::collections::{BTreeMap, BTreeSet};

use ledger_core::{
    CompletionEvent, DailyIncrement, DailyKey, RollupTotals, SessionIncrement, SessionRollup,
};

/// Groups accepted events by `(date, agent, model)`. Events that were
/// skipped as duplicates must not be passed in.
pub fn daily_increments(events: &[&CompletionEvent]) -> Vec<DailyIncrement> {
    let mut grouped: BTreeMap<DailyKey, DailyIncrement> = BTreeMap::new();
    for event in events {
        let key = DailyKey {
            date: event.date().to_string(),
            agent: event.agent.clone(),
            model: event.model.clone(),
        };
        let entry = grouped.entry(key).or_insert_with_key(|key| DailyIncrement {
            key: key.clone(),
            provider: event.provider.clone(),
            totals: RollupTotals::default(),
            sessions: BTreeSet::new(),
        });
        entry.totals.record(event);
        entry.sessions.insert(event.session_id.clone());
    }
    grouped.into_values().collect()
}

pub fn session_increments(events: &[&CompletionEvent]) -> Vec<SessionIncrement> {
    let mut grouped: BTreeMap<&str, SessionRollup> = BTreeMap::new();
    for event in events {
        let entry = grouped
            .entry(event.session_id.as_str())
            .or_insert_with(|| SessionRollup {
                session_id: event.session_id.clone(),
                agent: event.agent.clone(),
                models: BTreeSet::new(),
                providers: BTreeSet::new(),
                totals: RollupTotals::default(),
                first_timestamp: event.timestamp_iso.clone(),
                last_timestamp: event.timestamp_iso.clone(),
            });
        entry.totals.record(event);
        entry.models.insert(event.model.clone());
        entry.providers.insert(event.provider.clone());
        if event.timestamp_iso < entry.first_timestamp {
            entry.first_timestamp = event.timestamp_iso.clone();
        }
        if event.timestamp_iso > entry.last_timestamp {
            entry.last_timestamp = event.timestamp_iso.clone();
        }
    }
    grouped.into_values().collect()
}
