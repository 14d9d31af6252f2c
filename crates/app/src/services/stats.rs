use serde_json::Value;

use crate::error::Result;
use crate::query::StatsQuery;
use crate::services::{SharedCache, SharedConfig, open_db};

#[derive(Clone)]
pub struct StatsService {
    config: SharedConfig,
    cache: SharedCache,
}

impl StatsService {
    pub(super) fn new(config: SharedConfig, cache: SharedCache) -> Self {
        Self { config, cache }
    }

    /// Serves `query` from the cache, running it against the store on a miss.
    /// `bust` drops the cached entry first.
    pub fn fetch(&self, query: &StatsQuery, bust: bool) -> Result<Value> {
        let key = query.cache_key()?;
        if bust {
            self.cache.invalidate(&key);
        } else if let Some(value) = self.cache.get(&key) {
            tracing::trace!(%key, "stats cache hit");
            return Ok(value);
        }
        let generation = self.cache.generation();
        let db = open_db(&self.config)?;
        let value = query.run(&db)?;
        // A clear while the query ran means the result may predate new data.
        if self
            .cache
            .set_if_generation(&key, value.clone(), self.config.cache_ttl, generation)
        {
            tracing::debug!(%key, bust, "stats cache filled");
        } else {
            tracing::debug!(%key, "cache cleared during query, result not stored");
        }
        Ok(value)
    }
}
