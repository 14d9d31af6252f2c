use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use ledger_core::{DailyKey, IngestCursor};
use ledger_db::Db;

use crate::aggregate::{daily_increments, session_increments};
use crate::parser::{parse_lines, read_log_lines};
use crate::types::{IngestError, IngestOptions, IngestStats, Result};

/// Reads the ledger at `path` and ingests the lines past the stored cursor.
pub fn ingest_log_file(db: &mut Db, path: &Path, options: &IngestOptions) -> Result<IngestStats> {
    let lines = read_log_lines(path).inspect_err(|err| {
        tracing::warn!(path = %path.display(), "failed to read usage ledger: {}", err);
    })?;
    tracing::debug!(path = %path.display(), lines = lines.len(), "read usage ledger");
    run_ingestion(db, &lines, options)
}

/// Ingests `lines[cursor..]`. Every batch commits its events together with
/// the rollup deltas they produce; the cursor only moves once all batches
/// are in. A failed run can be retried from the unchanged cursor because
/// events that did commit are skipped as duplicates.
pub fn run_ingestion(db: &mut Db, lines: &[String], options: &IngestOptions) -> Result<IngestStats> {
    let started = Instant::now();
    let previous = db.get_ingest_cursor()?;
    let start_line = previous
        .as_ref()
        .map(|cursor| cursor.last_processed_line)
        .unwrap_or(0);
    let mut stats = IngestStats {
        start_line,
        cursor: previous.clone(),
        ..IngestStats::default()
    };
    let skip = usize::try_from(start_line).unwrap_or(usize::MAX);
    if skip >= lines.len() {
        tracing::info!(start_line, total_lines = lines.len(), "no new ledger lines");
        return Ok(stats);
    }

    let new_lines = &lines[skip..];
    let events = parse_lines(new_lines, start_line).inspect_err(|err| {
        if let IngestError::MalformedRecord { line, message } = err {
            tracing::warn!(line, "aborting ingestion on malformed record: {}", message);
        }
    })?;
    stats.lines_read = new_lines.len();
    tracing::info!(start_line, lines = new_lines.len(), "ingesting new ledger lines");

    let batch_size = options.batch_size.max(1);
    let mut daily_keys: BTreeSet<DailyKey> = BTreeSet::new();
    let mut session_keys: BTreeSet<String> = BTreeSet::new();
    for chunk in events.chunks(batch_size) {
        let batch = db.begin_batch()?;
        let accepted = batch.insert_completions(chunk)?;
        let daily = daily_increments(&accepted);
        let sessions = session_increments(&accepted);
        let daily_merged = batch.merge_daily_rollups(&daily)?;
        let sessions_merged = batch.merge_session_rollups(&sessions)?;
        batch.commit()?;

        stats.batches += 1;
        stats.events_inserted += accepted.len();
        stats.duplicates_skipped += chunk.len() - accepted.len();
        daily_keys.extend(daily.into_iter().map(|delta| delta.key));
        session_keys.extend(sessions.into_iter().map(|delta| delta.session_id));
        tracing::debug!(
            batch = stats.batches,
            accepted = accepted.len(),
            duplicates = chunk.len() - accepted.len(),
            daily_merged,
            sessions_merged,
            "committed ingestion batch"
        );
    }
    stats.daily_keys_touched = daily_keys.len();
    stats.session_keys_touched = session_keys.len();

    let last_processed_timestamp = events
        .last()
        .map(|event| event.timestamp_iso.clone())
        .unwrap_or_default();
    let total_before = previous
        .as_ref()
        .map(|cursor| cursor.total_ingested)
        .unwrap_or(0);
    let cursor = IngestCursor {
        last_processed_line: start_line + new_lines.len() as u64,
        last_processed_timestamp,
        total_ingested: total_before + stats.events_inserted as u64,
        updated_at: Utc::now().to_rfc3339(),
    };
    db.save_ingest_cursor(&cursor)?;
    stats.cursor = Some(cursor);

    tracing::info!(
        lines = stats.lines_read,
        inserted = stats.events_inserted,
        duplicates = stats.duplicates_skipped,
        batches = stats.batches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "ingestion complete"
    );
    Ok(stats)
}
