use crate::{DailyIncrement, DailyRollup, DailyRollupState, SessionIncrement, SessionRollup};

/// Folds a batch delta into a daily rollup. Session ids are unioned and the
/// count is taken from the union, so a session seen in several batches is
/// counted once.
pub fn merge_daily(existing: Option<DailyRollupState>, delta: &DailyIncrement) -> DailyRollupState {
    match existing {
        Some(mut state) => {
            state.rollup.totals = state.rollup.totals.add(&delta.totals);
            state.sessions.extend(delta.sessions.iter().cloned());
            state.rollup.session_count = state.sessions.len() as u64;
            state
        }
        None => DailyRollupState {
            rollup: DailyRollup {
                date: delta.key.date.clone(),
                agent: delta.key.agent.clone(),
                model: delta.key.model.clone(),
                provider: delta.provider.clone(),
                totals: delta.totals,
                session_count: delta.sessions.len() as u64,
            },
            sessions: delta.sessions.clone(),
        },
    }
}

pub fn merge_session(existing: Option<SessionRollup>, delta: &SessionIncrement) -> SessionRollup {
    let Some(mut rollup) = existing else {
        return delta.clone();
    };
    rollup.totals = rollup.totals.add(&delta.totals);
    rollup.models.extend(delta.models.iter().cloned());
    rollup.providers.extend(delta.providers.iter().cloned());
    // ISO-8601 strings from the ledger are fixed width, so string order is time order.
    if delta.first_timestamp < rollup.first_timestamp {
        rollup.first_timestamp = delta.first_timestamp.clone();
    }
    if delta.last_timestamp > rollup.last_timestamp {
        rollup.last_timestamp = delta.last_timestamp.clone();
    }
    rollup
}
