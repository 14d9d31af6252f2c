use std::fs;
use std::path::Path;

use chrono::DateTime;
use ledger_core::{CompletionEvent, CostBreakdown, TokenUsage};
use rayon::prelude::*;
use serde::Deserialize;

use crate::types::{IngestError, Result};

/// One ledger line as written by the agent runner. Extra fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    message_id: String,
    timestamp: String,
    agent: String,
    session_id: String,
    model: String,
    provider: String,
    role: String,
    input_tokens: u64,
    output_tokens: u64,
    cache_read: u64,
    cache_write: u64,
    total_tokens: u64,
    cost_input: f64,
    cost_output: f64,
    cost_cache_read: f64,
    cost_cache_write: f64,
    cost_total: f64,
}

/// Parses a single ledger line. `line_number` is the 1-based position in the
/// log and is only used for error reporting.
pub fn parse_line(line: &str, line_number: u64) -> Result<CompletionEvent> {
    let malformed = |message: String| IngestError::MalformedRecord {
        line: line_number,
        message,
    };
    if line.trim().is_empty() {
        return Err(malformed("empty line".to_string()));
    }
    let raw: RawRecord = serde_json::from_str(line).map_err(|err| malformed(err.to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(&raw.timestamp)
        .map_err(|err| malformed(format!("invalid timestamp {:?}: {}", raw.timestamp, err)))?
        .timestamp_millis();
    Ok(CompletionEvent {
        message_id: raw.message_id,
        timestamp,
        timestamp_iso: raw.timestamp,
        agent: raw.agent,
        session_id: raw.session_id,
        model: raw.model,
        provider: raw.provider,
        role: raw.role,
        usage: TokenUsage {
            input_tokens: raw.input_tokens,
            output_tokens: raw.output_tokens,
            cache_read: raw.cache_read,
            cache_write: raw.cache_write,
            total_tokens: raw.total_tokens,
        },
        cost: CostBreakdown {
            cost_input: raw.cost_input,
            cost_output: raw.cost_output,
            cost_cache_read: raw.cost_cache_read,
            cost_cache_write: raw.cost_cache_write,
            cost_total: raw.cost_total,
        },
    })
}

/// Parses `lines` in parallel, keeping their order. `offset` is the number
/// of lines preceding the slice in the log. The first malformed line in log
/// order is reported.
pub(crate) fn parse_lines(lines: &[String], offset: u64) -> Result<Vec<CompletionEvent>> {
    let parsed: Vec<Result<CompletionEvent>> = lines
        .par_iter()
        .enumerate()
        .map(|(index, line)| parse_line(line, offset + index as u64 + 1))
        .collect();
    parsed.into_iter().collect()
}

/// Reads the ledger as UTF-8 lines. Leading and trailing blank lines are
/// dropped and `\r\n` endings are accepted.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }
    Ok(content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect())
}
