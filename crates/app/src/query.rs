use ledger_core::DateRange;
use ledger_db::Db;
use serde_json::{Value, json};

use crate::config::StatsParams;
use crate::error::{AppError, Result};
use crate::util::time::resolve_range;

pub const DEFAULT_SESSIONS_LIMIT: usize = 10;
pub const MAX_SESSIONS_LIMIT: usize = 100;

/// Every read the dashboard can request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsQuery {
    Overview(DateRange),
    Sessions { limit: usize },
    SessionCount(DateRange),
    DailyCosts(DateRange),
    TokenTimeseries(DateRange),
    MessagesByDay(DateRange),
    CostByModel(DateRange),
    ModelComparison(DateRange),
    CacheMetrics(DateRange),
    DailyActivity,
}

impl StatsQuery {
    pub fn from_slug(slug: &str, params: &StatsParams) -> Result<Self> {
        if slug == "sessions" {
            let limit = params
                .limit
                .unwrap_or(DEFAULT_SESSIONS_LIMIT)
                .min(MAX_SESSIONS_LIMIT);
            return Ok(Self::Sessions { limit });
        }
        if slug == "daily-activity" {
            return Ok(Self::DailyActivity);
        }
        let build: fn(DateRange) -> Self = match slug {
            "overview" => Self::Overview,
            "session-count" => Self::SessionCount,
            "daily-costs" => Self::DailyCosts,
            "token-timeseries" => Self::TokenTimeseries,
            "messages-by-day" => Self::MessagesByDay,
            "cost-by-model" => Self::CostByModel,
            "model-comparison" => Self::ModelComparison,
            "cache-metrics" => Self::CacheMetrics,
            _ => return Err(AppError::NotFound("unknown endpoint".to_string())),
        };
        Ok(build(resolve_range(&params.range_params())?))
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Overview(_) => "overview",
            Self::Sessions { .. } => "sessions",
            Self::SessionCount(_) => "session-count",
            Self::DailyCosts(_) => "daily-costs",
            Self::TokenTimeseries(_) => "token-timeseries",
            Self::MessagesByDay(_) => "messages-by-day",
            Self::CostByModel(_) => "cost-by-model",
            Self::ModelComparison(_) => "model-comparison",
            Self::CacheMetrics(_) => "cache-metrics",
            Self::DailyActivity => "daily-activity",
        }
    }

    /// `dash:{slug}:{params}`; equal queries always produce equal keys.
    pub fn cache_key(&self) -> Result<String> {
        let params = match self {
            Self::Overview(range)
            | Self::SessionCount(range)
            | Self::DailyCosts(range)
            | Self::TokenTimeseries(range)
            | Self::MessagesByDay(range)
            | Self::CostByModel(range)
            | Self::ModelComparison(range)
            | Self::CacheMetrics(range) => serde_json::to_string(range)?,
            Self::Sessions { limit } => json!({ "limit": limit }).to_string(),
            Self::DailyActivity => "{}".to_string(),
        };
        Ok(format!("dash:{}:{}", self.slug(), params))
    }

    pub fn run(&self, db: &Db) -> Result<Value> {
        let value = match self {
            Self::Overview(range) => serde_json::to_value(db.overview_stats(range)?)?,
            Self::Sessions { limit } => serde_json::to_value(db.recent_sessions(*limit)?)?,
            Self::SessionCount(range) => json!(db.session_count(range)?),
            Self::DailyCosts(range) => serde_json::to_value(db.daily_costs(range)?)?,
            Self::TokenTimeseries(range) => serde_json::to_value(db.token_timeseries(range)?)?,
            Self::MessagesByDay(range) => serde_json::to_value(db.messages_by_day(range)?)?,
            Self::CostByModel(range) => serde_json::to_value(db.cost_by_model(range)?)?,
            Self::ModelComparison(range) => serde_json::to_value(db.model_comparison(range)?)?,
            Self::CacheMetrics(range) => serde_json::to_value(db.cache_metrics(range)?)?,
            Self::DailyActivity => serde_json::to_value(db.daily_activity()?)?,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<&str>, end: Option<&str>) -> StatsParams {
        StatsParams {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            ..StatsParams::default()
        }
    }

    #[test]
    fn parses_known_slugs() {
        let range = params(Some("2024-01-01"), Some("2024-01-31"));
        assert_eq!(
            StatsQuery::from_slug("overview", &range).expect("overview"),
            StatsQuery::Overview(DateRange::between("2024-01-01", "2024-01-31"))
        );
        assert_eq!(
            StatsQuery::from_slug("cache-metrics", &range).expect("cache").slug(),
            "cache-metrics"
        );
        assert_eq!(
            StatsQuery::from_slug("daily-activity", &range).expect("activity"),
            StatsQuery::DailyActivity
        );
    }

    #[test]
    fn sessions_limit_defaults_and_caps() {
        let mut query = StatsParams::default();
        assert_eq!(
            StatsQuery::from_slug("sessions", &query).expect("sessions"),
            StatsQuery::Sessions { limit: 10 }
        );
        query.limit = Some(500);
        assert_eq!(
            StatsQuery::from_slug("sessions", &query).expect("sessions"),
            StatsQuery::Sessions { limit: 100 }
        );
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let err = StatsQuery::from_slug("nope", &StatsParams::default()).expect_err("unknown");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn cache_key_uses_slug_and_params() {
        let query = StatsQuery::DailyCosts(DateRange::between("2024-01-01", "2024-01-31"));
        assert_eq!(
            query.cache_key().expect("key"),
            r#"dash:daily-costs:{"startDate":"2024-01-01","endDate":"2024-01-31"}"#
        );
        assert_eq!(
            StatsQuery::Overview(DateRange::all()).cache_key().expect("key"),
            "dash:overview:{}"
        );
        assert_eq!(
            StatsQuery::Sessions { limit: 10 }.cache_key().expect("key"),
            r#"dash:sessions:{"limit":10}"#
        );
    }
}
