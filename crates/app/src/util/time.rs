use chrono::{Duration, NaiveDate, Utc};
use ledger_core::DateRange;

use crate::config::RangeParams;
use crate::error::{AppError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns picker input into inclusive date bounds. Explicit dates win over
/// the preset; presets end at today's UTC date.
pub fn resolve_range(params: &RangeParams) -> Result<DateRange> {
    resolve_range_at(params, Utc::now().date_naive())
}

fn resolve_range_at(params: &RangeParams, today: NaiveDate) -> Result<DateRange> {
    if params.start_date.is_some() || params.end_date.is_some() {
        let start_date = params.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = params.end_date.as_deref().map(parse_date).transpose()?;
        return Ok(DateRange {
            start_date,
            end_date,
        });
    }
    let days = match params.range.as_deref().unwrap_or("all") {
        "all" => return Ok(DateRange::all()),
        "7d" => 7,
        "14d" => 14,
        "30d" => 30,
        value => {
            return Err(AppError::InvalidInput(format!(
                "unsupported range {}",
                value
            )));
        }
    };
    let start = today - Duration::days(days);
    Ok(DateRange::between(
        start.format(DATE_FORMAT).to_string(),
        today.format(DATE_FORMAT).to_string(),
    ))
}

/// Validates a `YYYY-MM-DD` date and returns it unchanged.
pub fn parse_date(value: &str) -> Result<String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|err| AppError::InvalidInput(format!("invalid date {}: {}", value, err)))
}
