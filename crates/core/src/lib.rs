use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

mod rollup;

pub use rollup::{merge_daily, merge_session};

/// Token counts carried by a completion event or accumulated by a rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub cost_input: f64,
    pub cost_output: f64,
    pub cost_cache_read: f64,
    pub cost_cache_write: f64,
    pub cost_total: f64,
}

/// One recorded LLM request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub message_id: String,
    /// Epoch milliseconds derived from `timestamp_iso`.
    pub timestamp: i64,
    pub timestamp_iso: String,
    pub agent: String,
    pub session_id: String,
    pub model: String,
    pub provider: String,
    pub role: String,
    #[serde(flatten)]
    pub usage: TokenUsage,
    #[serde(flatten)]
    pub cost: CostBreakdown,
}

impl CompletionEvent {
    /// Calendar date used for daily bucketing (the part of the ISO string before `T`).
    pub fn date(&self) -> &str {
        date_of(&self.timestamp_iso)
    }
}

pub fn date_of(timestamp_iso: &str) -> &str {
    timestamp_iso
        .split_once('T')
        .map(|(date, _)| date)
        .unwrap_or(timestamp_iso)
}

/// Running sums shared by daily and session rollups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupTotals {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_read: u64,
    pub total_cache_write: u64,
    pub message_count: u64,
}

impl RollupTotals {
    pub fn record(&mut self, event: &CompletionEvent) {
        self.total_cost += event.cost.cost_total;
        self.total_tokens = self.total_tokens.saturating_add(event.usage.total_tokens);
        self.total_input_tokens = self
            .total_input_tokens
            .saturating_add(event.usage.input_tokens);
        self.total_output_tokens = self
            .total_output_tokens
            .saturating_add(event.usage.output_tokens);
        self.total_cache_read = self.total_cache_read.saturating_add(event.usage.cache_read);
        self.total_cache_write = self
            .total_cache_write
            .saturating_add(event.usage.cache_write);
        self.message_count = self.message_count.saturating_add(1);
    }

    pub fn add(&self, other: &RollupTotals) -> RollupTotals {
        RollupTotals {
            total_cost: self.total_cost + other.total_cost,
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
            total_input_tokens: self
                .total_input_tokens
                .saturating_add(other.total_input_tokens),
            total_output_tokens: self
                .total_output_tokens
                .saturating_add(other.total_output_tokens),
            total_cache_read: self.total_cache_read.saturating_add(other.total_cache_read),
            total_cache_write: self
                .total_cache_write
                .saturating_add(other.total_cache_write),
            message_count: self.message_count.saturating_add(other.message_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyKey {
    pub date: String,
    pub agent: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRollup {
    pub date: String,
    pub agent: String,
    pub model: String,
    pub provider: String,
    #[serde(flatten)]
    pub totals: RollupTotals,
    /// Distinct sessions seen for this bucket, never a sum of batch counts.
    pub session_count: u64,
}

impl DailyRollup {
    pub fn key(&self) -> DailyKey {
        DailyKey {
            date: self.date.clone(),
            agent: self.agent.clone(),
            model: self.model.clone(),
        }
    }
}

/// A persisted daily rollup together with its distinct session ids.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRollupState {
    pub rollup: DailyRollup,
    pub sessions: BTreeSet<String>,
}

/// Daily delta computed from the events accepted in one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyIncrement {
    pub key: DailyKey,
    pub provider: String,
    pub totals: RollupTotals,
    pub sessions: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRollup {
    pub session_id: String,
    pub agent: String,
    pub models: BTreeSet<String>,
    pub providers: BTreeSet<String>,
    #[serde(flatten)]
    pub totals: RollupTotals,
    pub first_timestamp: String,
    pub last_timestamp: String,
}

/// Session deltas have the same shape as the persisted rollup.
pub type SessionIncrement = SessionRollup;

/// Persisted bookmark of how much of the source log has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestCursor {
    pub last_processed_line: u64,
    pub last_processed_timestamp: String,
    pub total_ingested: u64,
    pub updated_at: String,
}

/// Inclusive `YYYY-MM-DD` bounds; `None` leaves that side open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(
            (&self.start_date, &self.end_date),
            (Some(start), Some(end)) if start > end
        )
    }

    /// End bound extended to the last millisecond of the day, for comparisons
    /// against full ISO timestamps.
    pub fn end_of_day(&self) -> Option<String> {
        self.end_date
            .as_ref()
            .map(|end| format!("{}T23:59:59.999Z", end))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_messages: u64,
    /// Fraction in `0..=1`.
    pub cache_hit_rate: f64,
    pub models_used: u64,
    pub session_count: u64,
    pub total_cache_read: u64,
    pub total_cache_write: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelComparison {
    pub model: String,
    pub total_cost: f64,
    pub avg_cost_per_message: f64,
    pub total_tokens: u64,
    pub message_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCacheUsage {
    pub name: String,
    pub cache_read: u64,
    pub cache_write: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetrics {
    /// Percentage in `0..=100`, one decimal place.
    pub hit_rate: f64,
    pub total_cache_read: u64,
    pub total_cache_write: u64,
    pub by_model: Vec<ModelCacheUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTokens {
    pub date: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read: u64,
    pub cache_write: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMessages {
    pub date: String,
    pub messages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Idle,
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    pub fn from_messages(messages: u64) -> Self {
        match messages {
            201.. => Self::High,
            101..=200 => Self::Medium,
            51..=100 => Self::Low,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: String,
    pub messages: u64,
    pub level: ActivityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub agent: String,
    /// Display string of the models used, joined with `", "`.
    pub models: String,
    pub providers: String,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub message_count: u64,
    pub first_timestamp: String,
    pub last_timestamp: String,
}

impl SessionSummary {
    pub fn from_rollup(rollup: &SessionRollup) -> Self {
        Self {
            session_id: rollup.session_id.clone(),
            agent: rollup.agent.clone(),
            models: join_display(&rollup.models),
            providers: join_display(&rollup.providers),
            total_cost: round_to(rollup.totals.total_cost, 4),
            total_tokens: rollup.totals.total_tokens,
            message_count: rollup.totals.message_count,
            first_timestamp: rollup.first_timestamp.clone(),
            last_timestamp: rollup.last_timestamp.clone(),
        }
    }
}

fn join_display(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_of_takes_prefix_before_t() {
        assert_eq!(date_of("2024-01-01T10:00:00.000Z"), "2024-01-01");
        assert_eq!(date_of("2024-01-01"), "2024-01-01");
    }

    #[test]
    fn round_to_four_places() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(80.04, 1), 80.0);
    }

    #[test]
    fn inverted_range_detected() {
        assert!(DateRange::between("2024-02-01", "2024-01-01").is_inverted());
        assert!(!DateRange::between("2024-01-01", "2024-01-01").is_inverted());
        assert!(!DateRange::all().is_inverted());
    }

    #[test]
    fn end_of_day_extends_date_only_bound() {
        let range = DateRange::between("2024-01-01", "2024-01-02");
        assert_eq!(range.end_of_day().as_deref(), Some("2024-01-02T23:59:59.999Z"));
    }

    #[test]
    fn activity_level_thresholds() {
        assert_eq!(ActivityLevel::from_messages(0), ActivityLevel::Idle);
        assert_eq!(ActivityLevel::from_messages(50), ActivityLevel::Idle);
        assert_eq!(ActivityLevel::from_messages(51), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_messages(101), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_messages(200), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_messages(201), ActivityLevel::High);
    }

    #[test]
    fn completion_event_uses_source_field_names() {
        let event = CompletionEvent {
            message_id: "m1".to_string(),
            timestamp: 0,
            timestamp_iso: "1970-01-01T00:00:00.000Z".to_string(),
            agent: "a".to_string(),
            session_id: "s1".to_string(),
            model: "m".to_string(),
            provider: "p".to_string(),
            role: "assistant".to_string(),
            usage: TokenUsage::default(),
            cost: CostBreakdown::default(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert!(value.get("messageId").is_some());
        assert!(value.get("cacheRead").is_some());
        assert!(value.get("costCacheWrite").is_some());
    }
}
