use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Read-through store for serialized query results.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Duration);
    /// Bumped by every [`ResponseCache::clear`].
    fn generation(&self) -> u64;
    /// Stores `value` only if no clear happened since `generation` was read.
    /// Returns whether it was stored.
    fn set_if_generation(&self, key: &str, value: Value, ttl: Duration, generation: u64) -> bool;
    fn invalidate(&self, key: &str);
    fn clear(&self);
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, (Instant, Value)>,
    generation: u64,
}

impl CacheState {
    fn insert(&mut self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (expires_at, _)| *expires_at > now);
        self.entries.insert(key.to_string(), (now + ttl, value));
    }
}

/// In-process cache. Expired entries are dropped on read of the same key and
/// swept on every write.
#[derive(Default)]
pub struct MemoryCache {
    state: Mutex<CacheState>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut state = self.state.lock().ok()?;
        let fresh = state
            .entries
            .get(key)
            .filter(|(expires_at, _)| *expires_at > Instant::now())
            .map(|(_, value)| value.clone());
        if fresh.is_none() {
            state.entries.remove(key);
        }
        fresh
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.insert(key, value, ttl);
        }
    }

    fn generation(&self) -> u64 {
        self.state.lock().map(|state| state.generation).unwrap_or(0)
    }

    fn set_if_generation(&self, key: &str, value: Value, ttl: Duration, generation: u64) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.generation != generation {
            return false;
        }
        state.insert(key, value, ttl);
        true
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.remove(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
            state.generation = state.generation.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn get_returns_fresh_entries() {
        let cache = MemoryCache::new();
        cache.set("dash:overview:{}", json!({"totalCost": 1.5}), DEFAULT_CACHE_TTL);
        assert_eq!(cache.get("dash:overview:{}"), Some(json!({"totalCost": 1.5})));
        assert_eq!(cache.get("dash:sessions:{}"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), DEFAULT_CACHE_TTL);
        cache.set("b", json!(2), DEFAULT_CACHE_TTL);
        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn set_sweeps_expired_entries() {
        let cache = MemoryCache::new();
        for key in ["dash:daily-costs:a", "dash:daily-costs:b", "dash:daily-costs:c"] {
            cache.set(key, json!(1), Duration::ZERO);
            assert_eq!(cache.len(), 1);
        }
        cache.set("dash:daily-costs:d", json!(2), DEFAULT_CACHE_TTL);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("dash:daily-costs:d"), Some(json!(2)));
    }

    #[test]
    fn clear_rejects_writes_from_older_generation() {
        let cache = MemoryCache::new();
        let generation = cache.generation();
        cache.clear();
        assert!(!cache.set_if_generation("k", json!(1), DEFAULT_CACHE_TTL, generation));
        assert_eq!(cache.get("k"), None);

        let generation = cache.generation();
        assert!(cache.set_if_generation("k", json!(2), DEFAULT_CACHE_TTL, generation));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }
}
