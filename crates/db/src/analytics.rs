use std::collections::{BTreeMap, BTreeSet};

use ledger_core::{
    ActivityDay, ActivityLevel, DailyCost, DailyMessages, DailyTokens, DateRange, OverviewStats,
    round_to,
};

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn overview_stats(&self, range: &DateRange) -> Result<OverviewStats> {
        let rollups = self.load_daily_rollups(range)?;
        let mut stats = OverviewStats::default();
        let mut models = BTreeSet::new();
        for rollup in &rollups {
            stats.total_cost += rollup.totals.total_cost;
            stats.total_tokens += rollup.totals.total_tokens;
            stats.total_messages += rollup.totals.message_count;
            stats.total_cache_read += rollup.totals.total_cache_read;
            stats.total_cache_write += rollup.totals.total_cache_write;
            // Sum of per-bucket counts; a session spanning buckets is counted in each.
            stats.session_count += rollup.session_count;
            models.insert(rollup.model.as_str());
        }
        let cache_total = stats.total_cache_read + stats.total_cache_write;
        stats.cache_hit_rate = if cache_total > 0 {
            stats.total_cache_read as f64 / cache_total as f64
        } else {
            0.0
        };
        stats.models_used = models.len() as u64;
        Ok(stats)
    }

    pub fn daily_costs(&self, range: &DateRange) -> Result<Vec<DailyCost>> {
        let mut by_date: BTreeMap<String, f64> = BTreeMap::new();
        for rollup in self.load_daily_rollups(range)? {
            *by_date.entry(rollup.date).or_insert(0.0) += rollup.totals.total_cost;
        }
        Ok(by_date
            .into_iter()
            .map(|(date, cost)| DailyCost {
                date,
                cost: round_to(cost, 4),
            })
            .collect())
    }

    pub fn token_timeseries(&self, range: &DateRange) -> Result<Vec<DailyTokens>> {
        let mut by_date: BTreeMap<String, DailyTokens> = BTreeMap::new();
        for rollup in self.load_daily_rollups(range)? {
            let entry = by_date
                .entry(rollup.date.clone())
                .or_insert_with(|| DailyTokens {
                    date: rollup.date.clone(),
                    ..DailyTokens::default()
                });
            entry.input_tokens += rollup.totals.total_input_tokens;
            entry.output_tokens += rollup.totals.total_output_tokens;
            entry.cache_read += rollup.totals.total_cache_read;
            entry.cache_write += rollup.totals.total_cache_write;
        }
        Ok(by_date.into_values().collect())
    }

    pub fn messages_by_day(&self, range: &DateRange) -> Result<Vec<DailyMessages>> {
        Ok(self
            .messages_per_date(range)?
            .into_iter()
            .map(|(date, messages)| DailyMessages { date, messages })
            .collect())
    }

    /// Messages per day over the whole history, bucketed for a heatmap.
    pub fn daily_activity(&self) -> Result<Vec<ActivityDay>> {
        Ok(self
            .messages_per_date(&DateRange::all())?
            .into_iter()
            .map(|(date, messages)| ActivityDay {
                date,
                messages,
                level: ActivityLevel::from_messages(messages),
            })
            .collect())
    }

    fn messages_per_date(&self, range: &DateRange) -> Result<BTreeMap<String, u64>> {
        let mut by_date = BTreeMap::new();
        for rollup in self.load_daily_rollups(range)? {
            *by_date.entry(rollup.date).or_insert(0) += rollup.totals.message_count;
        }
        Ok(by_date)
    }
}
