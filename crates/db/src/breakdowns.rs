use std::cmp::Ordering;
use std::collections::BTreeMap;

use ledger_core::{
    CacheMetrics, DateRange, ModelCacheUsage, ModelComparison, NamedValue, RollupTotals, round_to,
};

use crate::Db;
use crate::error::Result;

impl Db {
    pub fn cost_by_model(&self, range: &DateRange) -> Result<Vec<NamedValue>> {
        let mut rows: Vec<NamedValue> = self
            .totals_by_model(range)?
            .into_iter()
            .map(|(name, totals)| NamedValue {
                name,
                value: round_to(totals.total_cost, 4),
            })
            .collect();
        rows.sort_by(|a, b| desc_then_name(a.value, b.value, &a.name, &b.name));
        Ok(rows)
    }

    pub fn model_comparison(&self, range: &DateRange) -> Result<Vec<ModelComparison>> {
        let mut rows: Vec<ModelComparison> = self
            .totals_by_model(range)?
            .into_iter()
            .map(|(model, totals)| ModelComparison {
                model,
                total_cost: round_to(totals.total_cost, 4),
                avg_cost_per_message: round_to(
                    totals.total_cost / totals.message_count.max(1) as f64,
                    4,
                ),
                total_tokens: totals.total_tokens,
                message_count: totals.message_count,
            })
            .collect();
        rows.sort_by(|a, b| desc_then_name(a.total_cost, b.total_cost, &a.model, &b.model));
        Ok(rows)
    }

    pub fn cache_metrics(&self, range: &DateRange) -> Result<CacheMetrics> {
        let by_model = self.totals_by_model(range)?;
        let total_cache_read: u64 = by_model.values().map(|t| t.total_cache_read).sum();
        let total_cache_write: u64 = by_model.values().map(|t| t.total_cache_write).sum();
        let total_cache = total_cache_read + total_cache_write;
        let hit_rate = if total_cache > 0 {
            round_to(total_cache_read as f64 / total_cache as f64 * 100.0, 1)
        } else {
            0.0
        };
        let mut by_model: Vec<ModelCacheUsage> = by_model
            .into_iter()
            .map(|(name, totals)| ModelCacheUsage {
                name,
                cache_read: totals.total_cache_read,
                cache_write: totals.total_cache_write,
            })
            .collect();
        by_model.sort_by(|a, b| {
            (b.cache_read + b.cache_write)
                .cmp(&(a.cache_read + a.cache_write))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(CacheMetrics {
            hit_rate,
            total_cache_read,
            total_cache_write,
            by_model,
        })
    }

    fn totals_by_model(&self, range: &DateRange) -> Result<BTreeMap<String, RollupTotals>> {
        let mut grouped: BTreeMap<String, RollupTotals> = BTreeMap::new();
        for rollup in self.load_daily_rollups(range)? {
            let entry = grouped.entry(rollup.model).or_default();
            *entry = entry.add(&rollup.totals);
        }
        Ok(grouped)
    }
}

fn desc_then_name(a: f64, b: f64, a_name: &str, b_name: &str) -> Ordering {
    b.total_cmp(&a).then_with(|| a_name.cmp(b_name))
}
